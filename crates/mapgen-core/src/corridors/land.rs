//! Open land belts along rift shoulders, styled from relief, rainfall and
//! latitude and nudged by the macro plate and wind axes.

use super::{Corridor, CorridorKind, CorridorSet, CorridorTile};
use crate::config::{BiasPolicy, DirectionalityConfig, LandCorridorConfig};
use crate::grid::Surface;
use crate::landmass::TerrainMap;
use crate::tags::RiftTags;
use crate::world::directionality::{alignment, Steering};

/// Elevation difference between neighbours that counts as relief.
const RELIEF_STEP: f64 = 60.0;

/// Averages over one candidate run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunProfile {
    pub avg_elevation: f64,
    pub avg_rainfall: f64,
    /// Share of run plots with a neighbour at least `RELIEF_STEP` apart.
    pub relief_frac: f64,
    pub lat_deg: f64,
}

impl RunProfile {
    fn measure(surface: &Surface, terrain: &TerrainMap, run: &[usize]) -> Self {
        let dims = surface.dims;
        let n = run.len().max(1) as f64;
        let avg_elevation = run.iter().map(|&i| surface.elevation[i]).sum::<f64>() / n;
        let avg_rainfall = run.iter().map(|&i| surface.engine_rainfall[i]).sum::<f64>() / n;
        let rugged = run
            .iter()
            .filter(|&&i| {
                dims.neighbors(i)
                    .filter(|&j| terrain.is_land(j))
                    .any(|j| (surface.elevation[j] - surface.elevation[i]).abs() >= RELIEF_STEP)
            })
            .count();
        let lat_deg = run.first().map_or(0.0, |&i| surface.lat_of(i).abs());
        Self { avg_elevation, avg_rainfall, relief_frac: rugged as f64 / n, lat_deg }
    }
}

/// Style from the run's terrain alone.
pub fn base_style(p: &RunProfile) -> &'static str {
    if p.relief_frac > 0.35 && p.avg_rainfall < 95.0 {
        "canyon"
    } else if p.avg_elevation > 650.0 && p.relief_frac < 0.2 {
        "plateau"
    } else if p.avg_elevation > 550.0 && p.relief_frac < 0.35 {
        "flatMtn"
    } else if p.avg_rainfall < 85.0 && p.lat_deg < 35.0 {
        "desertBelt"
    } else if p.avg_rainfall > 115.0 {
        "grasslandBelt"
    } else {
        "plainsBelt"
    }
}

/// Re-style a run that lies along the plate or wind axis. `plate_align` and
/// `wind_align` are in `0..=1`.
pub fn steer_style(base: &'static str, p: &RunProfile, plate_align: f64, wind_align: f64, cohesion: f64) -> &'static str {
    let hi = 0.75 * cohesion + 0.1;
    let mid = 0.5 * cohesion + 0.1;
    let mut style = base;
    if plate_align >= hi {
        if p.avg_elevation > 650.0 && p.relief_frac < 0.28 {
            style = "plateau";
        } else if p.relief_frac > 0.3 && p.avg_rainfall < 100.0 {
            style = "canyon";
        } else if p.avg_elevation > 560.0 && p.relief_frac < 0.35 {
            style = "flatMtn";
        }
    } else if plate_align >= mid && p.avg_elevation > 600.0 && p.relief_frac < 0.25 {
        style = "plateau";
    }
    if wind_align >= hi {
        if p.avg_rainfall > 110.0 || (p.lat_deg < 25.0 && p.avg_rainfall > 100.0) {
            style = "grasslandBelt";
        } else if p.avg_rainfall < 90.0 && p.lat_deg < 35.0 {
            style = "desertBelt";
        }
    } else if wind_align >= mid && p.avg_rainfall > 120.0 {
        style = "grasslandBelt";
    }
    style
}

pub fn plan(
    surface: &Surface,
    terrain: &TerrainMap,
    rifts: &RiftTags,
    cfg: &LandCorridorConfig,
    policy: &BiasPolicy,
    dir: &DirectionalityConfig,
    out: &mut CorridorSet,
) -> usize {
    let dims = surface.dims;
    if !cfg.use_rift_shoulders || cfg.max_corridors == 0 || rifts.shoulder.is_empty() || dims.height < 3 {
        return 0;
    }
    let min_run = (cfg.min_run_length as usize).max(12);
    let spacing = cfg.spacing as usize;
    let steering = Steering::new(dir);
    let cohesion = dir.cohesion.clamp(0.0, 1.0);
    // belts run east-west
    let plate_align = alignment(dir.primary_axes.plate_axis_deg, 0.0);

    let mut used_rows: Vec<usize> = Vec::new();
    let mut count = 0;
    'rows: for y in 1..dims.height - 1 {
        if used_rows.iter().any(|&r| r.abs_diff(y) < spacing) {
            continue;
        }
        let mut x = 0;
        while x < dims.width {
            let eligible = |x: usize| {
                let i = dims.idx(x, y);
                terrain.is_land(i) && rifts.shoulder.contains(&i)
            };
            while x < dims.width && !eligible(x) {
                x += 1;
            }
            let start = x;
            while x < dims.width && eligible(x) {
                x += 1;
            }
            if x - start < min_run {
                continue;
            }

            let run: Vec<usize> = (start..x).map(|cx| dims.idx(cx, y)).collect();
            let profile = RunProfile::measure(surface, terrain, &run);
            let wind_align = alignment(steering.wind_bias_deg(surface.latitude[y]), 0.0);
            let style = steer_style(base_style(&profile), &profile, plate_align, wind_align, cohesion);
            tracing::trace!(y, len = run.len(), style, "land corridor");
            out.push(Corridor {
                kind: CorridorKind::Land,
                axis: None,
                index: y as i64,
                protection: None,
                biomes_bias_strength: policy.biomes_bias_strength,
                tiles: run.into_iter().map(|plot| CorridorTile { plot, style: style.into() }).collect(),
            });
            used_rows.push(y);
            count += 1;
            if count >= cfg.max_corridors as usize {
                break 'rows;
            }
            // one belt per row
            continue 'rows;
        }
    }
    tracing::debug!(corridors = count, "land corridors planned");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::grid::{Biome, Dims};
    use serde_json::json;

    fn profile(avg_elevation: f64, avg_rainfall: f64, relief_frac: f64, lat_deg: f64) -> RunProfile {
        RunProfile { avg_elevation, avg_rainfall, relief_frac, lat_deg }
    }

    fn flat_surface(dims: Dims, elevation: f64, rainfall: f64) -> Surface {
        Surface {
            dims,
            latitude: (0..dims.height).map(|y| 60.0 - y as f64).collect(),
            elevation: vec![elevation; dims.len()],
            engine_rainfall: vec![rainfall; dims.len()],
            river: vec![false; dims.len()],
            wonder: vec![false; dims.len()],
            biome: vec![Biome::Plains; dims.len()],
            starts: Vec::new(),
        }
    }

    #[test]
    fn base_styles_follow_the_rule_order() {
        assert_eq!(base_style(&profile(300.0, 80.0, 0.5, 40.0)), "canyon");
        assert_eq!(base_style(&profile(700.0, 100.0, 0.1, 40.0)), "plateau");
        assert_eq!(base_style(&profile(600.0, 100.0, 0.3, 40.0)), "flatMtn");
        assert_eq!(base_style(&profile(200.0, 70.0, 0.0, 20.0)), "desertBelt");
        assert_eq!(base_style(&profile(200.0, 130.0, 0.0, 50.0)), "grasslandBelt");
        assert_eq!(base_style(&profile(200.0, 100.0, 0.0, 50.0)), "plainsBelt");
    }

    #[test]
    fn wind_aligned_wet_belts_turn_to_grassland() {
        let p = profile(200.0, 112.0, 0.0, 50.0);
        assert_eq!(steer_style("plainsBelt", &p, 0.0, 1.0, 0.6), "grasslandBelt");
        assert_eq!(steer_style("plainsBelt", &p, 0.0, 0.0, 0.6), "plainsBelt");
    }

    #[test]
    fn belts_follow_long_shoulder_runs_with_spacing() {
        let cfg = resolve(&json!({ "corridors": { "land": { "minRunLength": 12, "spacing": 3 } } })).unwrap();
        let dims = Dims::new(40, 20);
        let surface = flat_surface(dims, 200.0, 100.0);
        let terrain = TerrainMap::from_land(dims, &vec![true; dims.len()]);
        let mut rifts = RiftTags::default();
        for y in 5..8 {
            for x in 5..30 {
                rifts.shoulder.insert(dims.idx(x, y));
            }
        }
        let mut set = CorridorSet::default();
        let n = plan(
            &surface,
            &terrain,
            &rifts,
            &cfg.corridors.land,
            &cfg.corridors.policy.land,
            &cfg.world_model.directionality,
            &mut set,
        );
        assert_eq!(n, 1, "rows 6 and 7 fall inside the spacing of row 5");
        let belt = set.of_kind(CorridorKind::Land).next().unwrap();
        assert_eq!(belt.index, 5);
        assert_eq!(belt.tiles.len(), 25);
        assert!(belt.biomes_bias_strength > 0.0);
    }

    #[test]
    fn no_shoulders_no_belts() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(20, 10);
        let surface = flat_surface(dims, 200.0, 100.0);
        let terrain = TerrainMap::from_land(dims, &vec![true; dims.len()]);
        let mut set = CorridorSet::default();
        let n = plan(
            &surface,
            &terrain,
            &RiftTags::default(),
            &cfg.corridors.land,
            &cfg.corridors.policy.land,
            &cfg.world_model.directionality,
            &mut set,
        );
        assert_eq!(n, 0);
    }
}
