//! Hotspot trails: chains of deep-ocean points walked away from land, each
//! trail classified paradise or volcanic at its centre.

use super::Motif;
use crate::config::HotspotConfig;
use crate::corridors::LaneGuard;
use crate::landmass::TerrainMap;
use crate::rng::{chance, roll, stage_rng, weighted_pick};
use crate::tags::{HotspotKind, HotspotTags, HotspotTrail};

const SALT: u64 = 0x4075_F075_0000_0A11;
const PEAK_SALT: u64 = 0x4075_F075_0000_0B22;
const MAX_ATTEMPTS: usize = 200;

const DIRS: [(i64, i64); 8] = [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

pub fn tag_hotspots(terrain: &TerrainMap, cfg: &HotspotConfig, seed: u64, out: &mut HotspotTags) -> Motif {
    let dims = terrain.dims;
    let s = dims.sqrt_scale();
    let max_trails = if cfg.max_trails == 0 { 0 } else { ((cfg.max_trails as f64 * (0.9 + 0.6 * s)).round() as usize).max(1) };
    let steps = ((cfg.steps as f64 * (0.9 + 0.4 * s)).round() as usize).max(1);
    let step_len = cfg.step_len.max(1) as i64;
    let min_land = cfg.min_dist_from_land;
    let separation = cfg.min_trail_separation.max(1) as usize;
    if max_trails == 0 || dims.is_empty() {
        return Motif::default();
    }

    let land_dist = dims.distance_field(&terrain.land_mask(), min_land + 1);
    let open_water = |i: usize| terrain.is_water(i) && land_dist[i] > min_land;
    let mut rng = stage_rng(seed, SALT);
    let mut attempts = 0;

    while out.trails.len() < max_trails && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let start = dims.idx(roll(&mut rng, dims.width as u32) as usize, roll(&mut rng, dims.height as u32) as usize);
        let clear = |p: usize, pts: &HotspotTags| pts.points.iter().all(|&q| dims.manhattan(p, q) >= separation);
        if !open_water(start) || !clear(start, out) {
            continue;
        }

        let mut dir = roll(&mut rng, DIRS.len() as u32) as usize;
        let mut points = Vec::new();
        let mut at = start;
        for _ in 0..steps {
            let (dx, dy) = DIRS[dir];
            let Some(next) = dims.offset(at, dx * step_len, dy * step_len) else { break };
            at = next;
            if !open_water(at) || !clear(at, out) || points.contains(&at) {
                continue;
            }
            points.push(at);
            if roll(&mut rng, 5) == 0 {
                dir = (dir + DIRS.len() + roll(&mut rng, 3) as usize - 1) % DIRS.len();
            }
        }
        if points.is_empty() {
            continue;
        }

        let center = points[points.len() / 2];
        let kind = match weighted_pick(&mut rng, &[cfg.paradise_bias, cfg.volcanic_bias]) {
            Some(1) => HotspotKind::Volcanic,
            _ => HotspotKind::Paradise,
        };
        match kind {
            HotspotKind::Paradise => out.paradise.insert(center),
            HotspotKind::Volcanic => out.volcanic.insert(center),
        };
        out.points.extend(points.iter().copied());
        out.trails.push(HotspotTrail { points, center, kind });
    }

    let motif = Motif { placed: out.trails.len(), tiles: out.points.len(), requested: max_trails };
    tracing::debug!(
        trails = motif.placed,
        points = motif.tiles,
        paradise = out.paradise.len(),
        volcanic = out.volcanic.len(),
        "hotspot trails tagged"
    );
    motif
}

/// Raise volcanic trail centres to land with `volcanic_peak_chance`, through
/// the sea-lane guard. Returns the number of peaks surfaced.
pub fn surface_volcanic_peaks(
    terrain: &mut TerrainMap,
    hotspots: &HotspotTags,
    cfg: &HotspotConfig,
    guard: &mut LaneGuard,
    seed: u64,
) -> usize {
    let mut rng = stage_rng(seed, PEAK_SALT);
    let mut peaks = 0;
    for &center in &hotspots.volcanic {
        if chance(&mut rng, cfg.volcanic_peak_chance * 100.0) && terrain.is_water(center) && guard.try_raise(terrain, center) {
            peaks += 1;
        }
    }
    tracing::debug!(peaks, "volcanic peaks surfaced");
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::grid::Dims;
    use serde_json::json;

    /// Open ocean with a block of land in the middle.
    fn ocean_with_island(w: usize, h: usize) -> TerrainMap {
        let dims = Dims::new(w, h);
        let land: Vec<bool> = (0..dims.len())
            .map(|i| {
                let (x, y) = dims.xy(i);
                (w / 2 - 4..w / 2 + 4).contains(&x) && (h / 2 - 4..h / 2 + 4).contains(&y)
            })
            .collect();
        TerrainMap::from_land(dims, &land)
    }

    #[test]
    fn trails_keep_separation_and_distance_from_land() {
        let cfg = resolve(&json!({})).unwrap();
        let terrain = ocean_with_island(100, 70);
        let dims = terrain.dims;
        let mut tags = HotspotTags::default();
        let motif = tag_hotspots(&terrain, &cfg.story.hotspot, 42, &mut tags);
        assert!(motif.placed > 0, "open ocean must fit some trails");
        assert!(motif.placed <= motif.requested);

        let hc = &cfg.story.hotspot;
        let land_dist = dims.distance_field(&terrain.land_mask(), hc.min_dist_from_land + 1);
        for (a, ta) in tags.trails.iter().enumerate() {
            for &p in &ta.points {
                assert!(land_dist[p] >= hc.min_dist_from_land, "point {p} sits {} from land", land_dist[p]);
                for tb in tags.trails.iter().skip(a + 1) {
                    for &q in &tb.points {
                        assert!(
                            dims.manhattan(p, q) >= hc.min_trail_separation as usize,
                            "points {p} and {q} of different trails are too close"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn centres_are_classified_once() {
        let cfg = resolve(&json!({})).unwrap();
        let terrain = ocean_with_island(80, 60);
        let mut tags = HotspotTags::default();
        tag_hotspots(&terrain, &cfg.story.hotspot, 7, &mut tags);
        assert_eq!(tags.paradise.len() + tags.volcanic.len(), tags.trails.len());
        assert!(tags.paradise.is_disjoint(&tags.volcanic));
    }

    #[test]
    fn zero_trails_requested_tags_nothing() {
        let cfg = resolve(&json!({ "story": { "hotspot": { "maxTrails": 0 } } })).unwrap();
        let terrain = ocean_with_island(60, 40);
        let mut tags = HotspotTags::default();
        let motif = tag_hotspots(&terrain, &cfg.story.hotspot, 1, &mut tags);
        assert_eq!(motif.placed, 0);
        assert!(tags.points.is_empty());
    }

    #[test]
    fn certain_peaks_surface_every_volcanic_centre() {
        let cfg = resolve(&json!({ "story": { "hotspot": {
            "volcanicPeakChance": 1.0, "paradiseBias": 0, "volcanicBias": 1
        } } }))
        .unwrap();
        let mut terrain = ocean_with_island(80, 60);
        let mut tags = HotspotTags::default();
        tag_hotspots(&terrain, &cfg.story.hotspot, 9, &mut tags);
        let mut guard = LaneGuard::open(terrain.dims);
        let peaks = surface_volcanic_peaks(&mut terrain, &tags, &cfg.story.hotspot, &mut guard, 9);
        assert_eq!(peaks, tags.volcanic.len());
        assert!(tags.volcanic.iter().all(|&c| terrain.is_land(c)));
    }
}
