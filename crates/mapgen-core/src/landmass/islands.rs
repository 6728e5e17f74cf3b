//! Offshore island chains seeded from a sparse fractal and from hotspot
//! trails, kept off the continents and out of sea lanes.

use super::TerrainMap;
use crate::config::IslandsConfig;
use crate::corridors::{CorridorSet, LaneGuard};
use crate::fractal::{self, FractalSpec};
use crate::rng::{one_in, roll, stage_rng};
use crate::tags::{HotspotTags, MarginTags};

const SALT: u64 = 0x15_1A4D_C4A1_0005;
const FRACTAL_SALT: u64 = 0x15_1A4D_F4AC_0006;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IslandReport {
    pub seeds: usize,
    pub raised: usize,
    pub shoals: usize,
}

#[allow(clippy::too_many_arguments)]
pub fn add_island_chains(
    terrain: &mut TerrainMap,
    margins: &MarginTags,
    hotspots: &HotspotTags,
    corridors: &CorridorSet,
    sea_avoid_radius: u32,
    guard: &mut LaneGuard,
    cfg: &IslandsConfig,
    seed: u64,
) -> IslandReport {
    let dims = terrain.dims;
    let mut report = IslandReport::default();
    if dims.width < 5 || dims.height < 5 {
        return report;
    }
    let noise = fractal::generate(dims, FractalSpec::HILL, seed, FRACTAL_SALT);
    let threshold = fractal::percentile(&noise, cfg.fractal_threshold_percent);
    let mut rng = stage_rng(seed, SALT);

    for y in 2..dims.height - 2 {
        for x in 2..dims.width - 2 {
            let i = dims.idx(x, y);
            if !terrain.is_water(i)
                || terrain.near_land(i, cfg.min_dist_from_land_radius)
                || corridors.sea_lane_within(dims, i, sea_avoid_radius)
            {
                continue;
            }

            let near_active = dims.neighbors(i).any(|j| margins.active.contains(&j));
            let den = if near_active { cfg.base_island_den_near_active } else { cfg.base_island_den_else };
            let from_fractal = noise[i] > threshold && one_in(&mut rng, den);
            let from_hotspot = hotspots.points.contains(&i) && one_in(&mut rng, cfg.hotspot_seed_denom);
            if !from_fractal && !from_hotspot {
                continue;
            }
            report.seeds += 1;

            // paradise trails grow reefs and shallows rather than rock
            let center_land = if from_hotspot && hotspots.paradise.contains(&i) {
                terrain.shoal(i);
                report.shoals += 1;
                false
            } else if guard.try_raise(terrain, i) {
                report.raised += 1;
                true
            } else {
                false
            };

            let extra = 1 + roll(&mut rng, cfg.cluster_max.max(1));
            for _ in 0..extra {
                let dx = roll(&mut rng, 3) as i64 - 1;
                let dy = roll(&mut rng, 3) as i64 - 1;
                let Some(j) = dims.offset(i, dx, dy) else { continue };
                let (jx, jy) = dims.xy(j);
                if jx == 0 || jy == 0 || jx == dims.width - 1 || jy == dims.height - 1 || !terrain.is_water(j) {
                    continue;
                }
                if center_land {
                    if guard.try_raise(terrain, j) {
                        report.raised += 1;
                    }
                } else if !terrain.is_shallow(j) {
                    terrain.shoal(j);
                    report.shoals += 1;
                }
            }
        }
    }

    tracing::debug!(seeds = report.seeds, raised = report.raised, shoals = report.shoals, "island chains added");
    report
}
