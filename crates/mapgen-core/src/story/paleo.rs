//! Paleo-hydrology: traces of older rivers laid over the current ones.
//!
//! Runs after rivers are known. Deltas fan out from river mouths, oxbows sit
//! beside river plots, and fossil channels wander through dry lowland well
//! away from any live river. Nothing lands near a player start.

use rand::seq::SliceRandom;

use super::Motif;
use crate::config::PaleoConfig;
use crate::grid::{Dims, Surface};
use crate::landmass::TerrainMap;
use crate::rng::{chance, stage_rng};
use crate::tags::{PaleoTags, PlotSet};

const SALT: u64 = 0x9A1E_0000_D17A_0007;

/// Fossil channels only start where the land is at least this dry.
const DRY_RAINFALL: f64 = 80.0;
const LOWLAND: f64 = 300.0;
const ATTEMPTS_PER_CHANNEL: usize = 20;

const DIRS: [(i64, i64); 8] = [(1, 0), (1, 1), (0, 1), (-1, 1), (-1, 0), (-1, -1), (0, -1), (1, -1)];

struct Reach {
    river_dist: Vec<u32>,
    start_dist: Vec<u32>,
    min_river: u32,
    min_start: u32,
}

impl Reach {
    fn new(surface: &Surface, terrain: &TerrainMap, cfg: &PaleoConfig) -> Self {
        let dims = surface.dims;
        let rivers: Vec<bool> = (0..dims.len()).map(|i| surface.river[i] && terrain.is_land(i)).collect();
        let mut starts = vec![false; dims.len()];
        for &s in &surface.starts {
            starts[s] = true;
        }
        let min_river = cfg.fossil_channel_min_distance_from_current_rivers;
        let min_start = cfg.min_distance_from_starts;
        Self {
            river_dist: dims.distance_field(&rivers, min_river + 1),
            start_dist: dims.distance_field(&starts, min_start + 1),
            min_river,
            min_start,
        }
    }

    fn clear_of_starts(&self, i: usize) -> bool {
        self.start_dist[i] >= self.min_start
    }

    fn clear_of_rivers(&self, i: usize) -> bool {
        self.river_dist[i] >= self.min_river.max(1)
    }
}

fn spaced(dims: Dims, placed: &[usize], i: usize, gap: usize) -> bool {
    placed.iter().all(|&p| dims.chebyshev(p, i) >= gap)
}

fn tag_deltas(
    surface: &Surface,
    terrain: &TerrainMap,
    reach: &Reach,
    cfg: &PaleoConfig,
    rng: &mut impl rand::Rng,
    out: &mut PaleoTags,
) -> usize {
    let dims = surface.dims;
    let mut mouths: Vec<usize> = (0..dims.len())
        .filter(|&i| surface.river[i] && terrain.is_coastal_land(i) && reach.clear_of_starts(i))
        .collect();
    mouths.shuffle(rng);

    let gap = 2 * cfg.delta_fan_radius as usize + 2;
    let mut placed = Vec::new();
    for mouth in mouths {
        if placed.len() >= cfg.max_deltas as usize {
            break;
        }
        if !spaced(dims, &placed, mouth, gap) {
            continue;
        }
        placed.push(mouth);
        for j in dims.within(mouth, cfg.delta_fan_radius) {
            if terrain.is_land(j) && reach.clear_of_starts(j) && surface.elevation[j] < LOWLAND {
                out.deltas.insert(j);
                if chance(rng, cfg.delta_marsh_chance * 100.0) {
                    out.delta_marsh.insert(j);
                }
            }
        }
        out.deltas.insert(mouth);
    }
    placed.len()
}

fn tag_oxbows(
    surface: &Surface,
    terrain: &TerrainMap,
    reach: &Reach,
    cfg: &PaleoConfig,
    rng: &mut impl rand::Rng,
    out: &mut PaleoTags,
) -> usize {
    let dims = surface.dims;
    let mut candidates: Vec<usize> = (0..dims.len())
        .filter(|&i| {
            terrain.is_land(i)
                && !surface.river[i]
                && !out.deltas.contains(&i)
                && surface.elevation[i] < cfg.oxbow_elevation_max
                && reach.clear_of_starts(i)
                && dims.neighbors(i).any(|j| surface.river[j])
        })
        .collect();
    candidates.shuffle(rng);

    let mut placed = Vec::new();
    for i in candidates {
        if placed.len() >= cfg.max_oxbows as usize {
            break;
        }
        if spaced(dims, &placed, i, 3) {
            placed.push(i);
            out.oxbows.insert(i);
        }
    }
    placed.len()
}

/// Walk downhill from `start` in strides of `step`, staying on dry-lowland
/// plots clear of rivers and starts.
fn walk_channel(
    surface: &Surface,
    terrain: &TerrainMap,
    reach: &Reach,
    taken: &PlotSet,
    start: usize,
    length: usize,
    step: u32,
) -> Vec<usize> {
    let dims = surface.dims;
    let ok = |i: usize, path: &[usize]| {
        terrain.is_land(i)
            && !path.contains(&i)
            && !taken.contains(&i)
            && surface.elevation[i] < LOWLAND
            && reach.clear_of_rivers(i)
            && reach.clear_of_starts(i)
    };
    let mut path = vec![start];
    let mut at = start;
    while path.len() < length {
        // lowest reachable stride wins; ties keep the first direction
        let next = DIRS
            .iter()
            .filter_map(|&(dx, dy)| {
                let stride: Vec<usize> = (1..=step as i64).map_while(|k| dims.offset(at, dx * k, dy * k)).collect();
                (stride.len() == step as usize && stride.iter().all(|&j| ok(j, &path))).then_some(stride)
            })
            .min_by(|a, b| {
                let ea = surface.elevation[a[a.len() - 1]];
                let eb = surface.elevation[b[b.len() - 1]];
                ea.total_cmp(&eb)
            });
        let Some(stride) = next else { break };
        at = stride[stride.len() - 1];
        path.extend(stride);
    }
    path.truncate(length);
    path
}

fn tag_fossil_channels(
    rain: &[f64],
    surface: &Surface,
    terrain: &TerrainMap,
    reach: &Reach,
    cfg: &PaleoConfig,
    rng: &mut impl rand::Rng,
    out: &mut PaleoTags,
) -> usize {
    let dims = surface.dims;
    let s = dims.sqrt_scale();
    let length_mul = (1.0 + cfg.size_scaling.length_mul_sqrt * (s - 1.0)).max(0.1);
    let length = ((cfg.fossil_channel_length_tiles as f64 * length_mul).round() as usize).max(2);
    let min_keep = (length / 2).max(2);
    let step = cfg.fossil_channel_step.max(1);

    let mut starts: Vec<usize> = (0..dims.len())
        .filter(|&i| {
            terrain.is_land(i)
                && rain[i] < DRY_RAINFALL
                && surface.elevation[i] < LOWLAND
                && reach.clear_of_rivers(i)
                && reach.clear_of_starts(i)
        })
        .collect();
    starts.shuffle(rng);
    starts.truncate(cfg.max_fossil_channels as usize * ATTEMPTS_PER_CHANNEL);

    let mut channels = 0;
    for start in starts {
        if channels >= cfg.max_fossil_channels as usize {
            break;
        }
        if out.fossil_channels.contains(&start) || dims.within(start, 1).any(|j| out.fossil_channels.contains(&j)) {
            continue;
        }
        let path = walk_channel(surface, terrain, reach, &out.fossil_channels, start, length, step);
        if path.len() < min_keep {
            continue;
        }
        out.fossil_channels.extend(path);
        channels += 1;
    }
    channels
}

pub fn apply_paleo(
    rain: &mut [f64],
    surface: &Surface,
    terrain: &TerrainMap,
    cfg: &PaleoConfig,
    seed: u64,
    out: &mut PaleoTags,
) -> Motif {
    let dims = surface.dims;
    if dims.is_empty() {
        return Motif::default();
    }
    let reach = Reach::new(surface, terrain, cfg);
    let mut rng = stage_rng(seed, SALT);

    let deltas = tag_deltas(surface, terrain, &reach, cfg, &mut rng, out);
    let oxbows = tag_oxbows(surface, terrain, &reach, cfg, &mut rng, out);
    let channels = tag_fossil_channels(rain, surface, terrain, &reach, cfg, &mut rng, out);

    let humidity = cfg.fossil_channel_humidity;
    for &i in out.deltas.iter().chain(&out.oxbows) {
        rain[i] = (rain[i] + humidity).clamp(0.0, 200.0);
    }
    let carving = &cfg.elevation_carving;
    let floor_delta = if carving.enable_canyon_rim { humidity - carving.canyon_dry_bonus } else { humidity };
    for &i in &out.fossil_channels {
        rain[i] = (rain[i] + floor_delta).clamp(0.0, 200.0);
    }
    if carving.enable_canyon_rim && carving.rim_width > 0 {
        let reach_out = (carving.rim_width / 2).max(1);
        let rims: PlotSet = out
            .fossil_channels
            .iter()
            .flat_map(|&c| dims.within(c, reach_out))
            .filter(|&j| terrain.is_land(j) && !out.fossil_channels.contains(&j))
            .collect();
        for &j in &rims {
            rain[j] = (rain[j] - carving.bluff_wet_reduction).clamp(0.0, 200.0);
        }
        out.canyon_rims = rims;
    }

    let tiles = out.deltas.len() + out.oxbows.len() + out.fossil_channels.len();
    let requested = (cfg.max_deltas + cfg.max_oxbows + cfg.max_fossil_channels) as usize;
    tracing::debug!(deltas, oxbows, channels, rims = out.canyon_rims.len(), "paleo hydrology tagged");
    Motif { placed: deltas + oxbows + channels, tiles, requested }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::grid::Biome;
    use serde_json::json;

    /// Land west of column 30, sloping down eastward, with a river along
    /// row 15 that meets the sea at column 29. One start at (5, 5).
    fn basin() -> (Surface, TerrainMap) {
        let dims = Dims::new(40, 30);
        let land: Vec<bool> = (0..dims.len()).map(|i| dims.xy(i).0 < 30).collect();
        let surface = Surface {
            dims,
            latitude: vec![30.0; dims.height],
            elevation: (0..dims.len()).map(|i| 200.0 - 3.0 * dims.xy(i).0 as f64).collect(),
            engine_rainfall: vec![60.0; dims.len()],
            river: (0..dims.len())
                .map(|i| {
                    let (x, y) = dims.xy(i);
                    y == 15 && (10..30).contains(&x)
                })
                .collect(),
            wonder: vec![false; dims.len()],
            biome: vec![Biome::Plains; dims.len()],
            starts: vec![dims.idx(5, 5)],
        };
        (surface, TerrainMap::from_land(dims, &land))
    }

    #[test]
    fn delta_fans_out_from_the_river_mouth() {
        let cfg = resolve(&json!({})).unwrap();
        let (surface, terrain) = basin();
        let dims = surface.dims;
        let mut rain = vec![60.0; dims.len()];
        let mut tags = PaleoTags::default();
        apply_paleo(&mut rain, &surface, &terrain, &cfg.story.paleo, 3, &mut tags);
        let mouth = dims.idx(29, 15);
        assert!(tags.deltas.contains(&mouth), "the only river mouth gets a delta");
        assert!(tags.deltas.iter().all(|&i| dims.chebyshev(i, mouth) <= 1));
        assert!(tags.delta_marsh.is_subset(&tags.deltas));
    }

    #[test]
    fn fossil_channels_keep_clear_of_rivers_and_starts() {
        let cfg = resolve(&json!({})).unwrap();
        let pc = &cfg.story.paleo;
        let (surface, terrain) = basin();
        let dims = surface.dims;
        let mut rain = vec![60.0; dims.len()];
        let mut tags = PaleoTags::default();
        apply_paleo(&mut rain, &surface, &terrain, pc, 11, &mut tags);
        assert!(!tags.fossil_channels.is_empty(), "dry lowland should host channels");
        let start = dims.idx(5, 5);
        let rivers: Vec<usize> = (0..dims.len()).filter(|&i| surface.river[i]).collect();
        for &i in &tags.fossil_channels {
            let gap = rivers.iter().map(|&r| dims.chebyshev(i, r)).min().unwrap_or(usize::MAX);
            assert!(gap >= pc.fossil_channel_min_distance_from_current_rivers as usize, "plot {i} is {gap} from the river");
            assert!(dims.chebyshev(i, start) >= pc.min_distance_from_starts as usize, "plot {i} too near the start");
            assert!(terrain.is_land(i));
        }
        assert!(tags.canyon_rims.is_disjoint(&tags.fossil_channels));
        assert!(rain.iter().all(|r| (0.0..=200.0).contains(r)));
    }

    #[test]
    fn oxbows_sit_beside_the_river() {
        let cfg = resolve(&json!({})).unwrap();
        let (surface, terrain) = basin();
        let dims = surface.dims;
        let mut rain = vec![60.0; dims.len()];
        let mut tags = PaleoTags::default();
        apply_paleo(&mut rain, &surface, &terrain, &cfg.story.paleo, 5, &mut tags);
        assert!(!tags.oxbows.is_empty());
        assert!(tags.oxbows.len() <= cfg.story.paleo.max_oxbows as usize);
        for &i in &tags.oxbows {
            assert!(!surface.river[i]);
            assert!(dims.neighbors(i).any(|j| surface.river[j]), "oxbow {i} is not beside the river");
        }
    }

    #[test]
    fn zero_caps_tag_nothing() {
        let cfg = resolve(&json!({ "story": { "paleo": {
            "maxDeltas": 0, "maxOxbows": 0, "maxFossilChannels": 0
        } } }))
        .unwrap();
        let (surface, terrain) = basin();
        let mut rain = vec![60.0; surface.dims.len()];
        let mut tags = PaleoTags::default();
        let motif = apply_paleo(&mut rain, &surface, &terrain, &cfg.story.paleo, 5, &mut tags);
        assert_eq!(motif.placed, 0);
        assert_eq!(tags, PaleoTags::default());
        assert!(rain.iter().all(|r| *r == 60.0));
    }
}
