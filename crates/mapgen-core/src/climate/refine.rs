//! Earthlike refinement of baseline rainfall, four passes in order: water
//! gradient, rain shadow, river greening and closed low basins.

use crate::config::{ClimateRefineConfig, DirectionalityConfig};
use crate::grid::Surface;
use crate::landmass::TerrainMap;
use crate::world::WorldModel;

use super::clamp_rain;

/// Plots at or above this elevation block moist air.
const BARRIER_ELEVATION: f64 = 500.0;
/// A neighbour this much above a plot still counts as its rim.
const BASIN_RIM: f64 = 20.0;

/// Land near water gains humidity, fading ring by ring.
pub fn water_gradient(rain: &mut [f64], surface: &Surface, terrain: &TerrainMap, cfg: &ClimateRefineConfig) -> usize {
    let dims = surface.dims;
    let wg = &cfg.water_gradient;
    let dist = dims.distance_field(&terrain.water_mask(), wg.radius);
    let mut touched = 0;
    for i in 0..dims.len() {
        if terrain.is_water(i) || dist[i] == u32::MAX {
            continue;
        }
        let mut bonus = wg.radius.saturating_sub(dist[i]) as f64 * wg.per_ring_bonus;
        if surface.elevation[i] < 150.0 {
            bonus += wg.lowland_bonus;
        }
        rain[i] = clamp_rain(rain[i] + bonus);
        touched += 1;
    }
    touched
}

/// Steps upwind from `i` to the first barrier plot, or 0 if the air arrives
/// unobstructed.
pub fn upwind_barrier(surface: &Surface, terrain: &TerrainMap, world: &WorldModel, i: usize, steps: u32) -> u32 {
    let dims = surface.dims;
    let mut at = i;
    for s in 1..=steps {
        let (dx, dy) = world.wind_step(at, surface.lat_of(at));
        let Some(next) = dims.offset(at, -dx, -dy) else { break };
        if terrain.is_land(next) && surface.elevation[next] >= BARRIER_ELEVATION {
            return s;
        }
        at = next;
    }
    0
}

/// Land behind a barrier loses rainfall; the base cut grows with distance
/// to the barrier.
pub fn rain_shadow(
    rain: &mut [f64],
    surface: &Surface,
    terrain: &TerrainMap,
    world: &WorldModel,
    cfg: &ClimateRefineConfig,
    dir: &DirectionalityConfig,
) -> usize {
    let oro = &cfg.orographic;
    let coh = dir.cohesion.clamp(0.0, 1.0);
    let follow = dir.interplay.winds_follow_plates.clamp(0.0, 1.0);
    let steps = (oro.steps as i64 + (coh * follow).round() as i64).max(1) as u32;
    let mut touched = 0;
    for i in 0..surface.dims.len() {
        if terrain.is_water(i) {
            continue;
        }
        let barrier = upwind_barrier(surface, terrain, world, i, steps);
        if barrier > 0 {
            let cut = oro.reduction_base + barrier as f64 * oro.reduction_per_step;
            rain[i] = clamp_rain(rain[i] - cut);
            touched += 1;
        }
    }
    touched
}

/// River-side plots green up; closed lowland basins hold moisture.
pub fn rivers_and_basins(rain: &mut [f64], surface: &Surface, terrain: &TerrainMap, cfg: &ClimateRefineConfig) -> usize {
    let dims = surface.dims;
    let rc = &cfg.river_corridor;
    let lb = &cfg.low_basin;
    let mut touched = 0;
    for i in 0..dims.len() {
        if terrain.is_water(i) {
            continue;
        }
        let elevation = surface.elevation[i];
        let mut delta = 0.0;
        if surface.river[i] || dims.neighbors(i).any(|j| surface.river[j]) {
            delta += if elevation < 250.0 { rc.lowland_adjacency_bonus } else { rc.highland_adjacency_bonus };
        }
        let closed = dims
            .within(i, lb.radius)
            .filter(|&j| j != i)
            .all(|j| surface.elevation[j] >= elevation + BASIN_RIM);
        if closed && elevation < 200.0 {
            delta += lb.delta;
        }
        if delta != 0.0 {
            rain[i] = clamp_rain(rain[i] + delta);
            touched += 1;
        }
    }
    touched
}

/// All four passes; returns plots touched per pass.
pub fn refine(
    rain: &mut [f64],
    surface: &Surface,
    terrain: &TerrainMap,
    world: &WorldModel,
    cfg: &ClimateRefineConfig,
    dir: &DirectionalityConfig,
) -> [usize; 3] {
    let gradient = water_gradient(rain, surface, terrain, cfg);
    let shadow = rain_shadow(rain, surface, terrain, world, cfg, dir);
    let rivers = rivers_and_basins(rain, surface, terrain, cfg);
    tracing::debug!(gradient, shadow, rivers, "climate refined");
    [gradient, shadow, rivers]
}
