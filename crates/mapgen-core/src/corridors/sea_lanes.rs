//! Sea lanes: the longest open-water runs along columns, rows and (optionally)
//! diagonals, greedily picked by score with parallel lanes kept apart.

use super::{Corridor, CorridorKind, CorridorSet, CorridorTile, LaneAxis};
use crate::config::{DirectionalityConfig, SeaLaneConfig, SeaPolicy};
use crate::grid::Dims;
use crate::landmass::TerrainMap;
use crate::world::directionality::unit;

#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    axis: LaneAxis,
    index: i64,
    plots: Vec<usize>,
    score: i64,
}

/// Plots visited along one scan line, in order.
fn line(dims: Dims, axis: LaneAxis, index: i64) -> Vec<usize> {
    let (w, h) = (dims.width as i64, dims.height as i64);
    match axis {
        LaneAxis::Col => (0..h).filter_map(|y| dims.at(index, y)).collect(),
        LaneAxis::Row => (0..w).filter_map(|x| dims.at(x, index)).collect(),
        LaneAxis::DiagNe => (0..w).filter_map(|x| dims.at(x, index - x)).collect(),
        LaneAxis::DiagNw => (0..h).filter_map(|y| dims.at(index + y, y)).collect(),
    }
}

/// Longest contiguous water stretch of `plots`.
fn longest_water_run<'a>(terrain: &TerrainMap, plots: &'a [usize]) -> &'a [usize] {
    let (mut best, mut best_len) = (0, 0);
    let mut start = 0;
    let mut len = 0;
    for (k, &p) in plots.iter().enumerate() {
        if terrain.is_water(p) {
            if len == 0 {
                start = k;
            }
            len += 1;
            if len > best_len {
                best = start;
                best_len = len;
            }
        } else {
            len = 0;
        }
    }
    &plots[best..best + best_len]
}

/// Water extends `(min_width - 1) / 2` plots to both sides across the lane.
fn has_width(dims: Dims, terrain: &TerrainMap, plot: usize, axis: LaneAxis, min_width: u32) -> bool {
    let r = (min_width.saturating_sub(1) / 2) as i64;
    if !terrain.is_water(plot) {
        return false;
    }
    let (dx, dy) = axis.across();
    (-r..=r).all(|t| dims.offset(plot, dx * t, dy * t).is_some_and(|p| terrain.is_water(p)))
}

/// Score bonus for lanes running with the prevailing wind and current axes.
fn directional_bonus(dir: &DirectionalityConfig, axis: LaneAxis) -> i64 {
    let cohesion = dir.cohesion.clamp(0.0, 1.0);
    if cohesion <= 0.0 {
        return 0;
    }
    let plate = dir.primary_axes.plate_axis_deg.round();
    let winds_follow = dir.interplay.winds_follow_plates.clamp(0.0, 1.0) * cohesion;
    let currents_follow = dir.interplay.currents_follow_winds.clamp(0.0, 1.0) * cohesion;
    let wind = unit(dir.primary_axes.wind_bias_deg.round() + (plate * winds_follow).round());
    let current = unit(dir.primary_axes.current_bias_deg.round() + (plate * winds_follow * 0.5).round());
    let (lx, ly) = axis.along();
    let dot_wind = (wind.0 * lx + wind.1 * ly).abs();
    let dot_current = (current.0 * lx + current.1 * ly).abs();
    let w_current = 0.8 + 0.6 * currents_follow;
    let align = (dot_wind + dot_current * w_current) / (1.0 + w_current);
    (align * 25.0 * cohesion).round() as i64
}

fn candidates(
    dims: Dims,
    terrain: &TerrainMap,
    cfg: &SeaLaneConfig,
    dir: &DirectionalityConfig,
) -> Vec<Candidate> {
    let (w, h) = (dims.width as i64, dims.height as i64);
    let stride = (cfg.scan_stride as i64).max(2);
    let min_frac = cfg.min_length_frac.clamp(0.4, 1.0);
    let min_width = cfg.min_channel_width.max(1);

    let mut axes: Vec<(LaneAxis, Vec<i64>, i64)> = vec![
        (LaneAxis::Col, (1..w - 1).step_by(stride as usize).collect(), 3),
        (LaneAxis::Row, (1..h - 1).step_by(stride as usize).collect(), 3),
    ];
    if cfg.prefer_diagonals {
        axes.push((LaneAxis::DiagNe, (0..=(w - 1) + (h - 1)).step_by(stride as usize).collect(), 2));
        axes.push((LaneAxis::DiagNw, (-(h - 1)..=w - 1).step_by(stride as usize).collect(), 2));
    }

    let mut out = Vec::new();
    for (axis, indices, width_weight) in axes {
        let bonus = directional_bonus(dir, axis);
        for index in indices {
            let plots = line(dims, axis, index);
            if plots.is_empty() {
                continue;
            }
            let run = longest_water_run(terrain, &plots);
            let min_len = (plots.len() as f64 * min_frac).floor() as usize;
            if run.is_empty() || run.len() < min_len {
                continue;
            }
            let step = (run.len() / 10).max(1);
            let wide = run.iter().step_by(step).all(|&p| has_width(dims, terrain, p, axis, min_width));
            let lane_width = if wide { min_width as i64 } else { 1 };
            let coverage = run.len() as f64 / plots.len() as f64;
            let score = run.len() as i64 + width_weight * lane_width + (coverage * 10.0).round() as i64 + bonus;
            out.push(Candidate { axis, index, plots: run.to_vec(), score });
        }
    }
    out
}

pub fn plan(
    terrain: &TerrainMap,
    cfg: &SeaLaneConfig,
    policy: &SeaPolicy,
    dir: &DirectionalityConfig,
    out: &mut CorridorSet,
) -> usize {
    let dims = terrain.dims;
    if cfg.max_lanes == 0 || dims.width < 3 || dims.height < 3 {
        return 0;
    }
    let mut pool = candidates(dims, terrain, cfg, dir);
    // stable: ties keep scan order
    pool.sort_by(|a, b| b.score.cmp(&a.score));

    let spacing = cfg.lane_spacing as i64;
    let mut chosen: Vec<(LaneAxis, i64)> = Vec::new();
    for c in pool {
        if chosen.len() >= cfg.max_lanes as usize {
            break;
        }
        if chosen.iter().any(|&(axis, index)| axis == c.axis && (index - c.index).abs() < spacing) {
            continue;
        }
        chosen.push((c.axis, c.index));
        let tiles = c
            .plots
            .iter()
            .map(|&plot| {
                let style = if terrain.near_land(plot, 2) { "coastal" } else { "ocean" };
                CorridorTile { plot, style: style.to_string() }
            })
            .collect();
        out.push(Corridor {
            kind: CorridorKind::Sea,
            axis: Some(c.axis),
            index: c.index,
            protection: Some(policy.protection),
            biomes_bias_strength: 0.0,
            tiles,
        });
    }
    tracing::debug!(lanes = chosen.len(), "sea lanes planned");
    chosen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;

    fn open_sea(w: usize, h: usize) -> TerrainMap {
        TerrainMap::ocean(Dims::new(w, h))
    }

    #[test]
    fn longest_water_run_picks_the_widest_gap_between_islands() {
        let dims = Dims::new(12, 1);
        let land: Vec<bool> = (0..12).map(|x| matches!(x, 2 | 3 | 9)).collect();
        let terrain = TerrainMap::from_land(dims, &land);
        let row: Vec<usize> = (0..12).collect();
        assert_eq!(longest_water_run(&terrain, &row), &[4, 5, 6, 7, 8]);
        assert!(longest_water_run(&TerrainMap::from_land(dims, &[true; 12]), &row).is_empty());
    }

    #[test]
    fn lanes_keep_parallel_spacing() {
        let cfg = resolve(&json!({ "corridors": { "sea": { "maxLanes": 6, "scanStride": 2 } } })).unwrap();
        let terrain = open_sea(60, 40);
        let mut set = CorridorSet::default();
        let n = plan(&terrain, &cfg.corridors.sea, &cfg.corridors.policy.sea, &cfg.world_model.directionality, &mut set);
        assert_eq!(n, 6);
        let lanes: Vec<_> = set.of_kind(CorridorKind::Sea).collect();
        for (a, la) in lanes.iter().enumerate() {
            for lb in lanes.iter().skip(a + 1) {
                if la.axis == lb.axis {
                    assert!(
                        (la.index - lb.index).abs() >= cfg.corridors.sea.lane_spacing as i64,
                        "parallel lanes at {} and {} are too close",
                        la.index,
                        lb.index
                    );
                }
            }
        }
    }

    #[test]
    fn a_wall_of_land_blocks_crossing_lanes() {
        let cfg = resolve(&json!({ "corridors": { "sea": { "preferDiagonals": false } } })).unwrap();
        let dims = Dims::new(40, 30);
        let land: Vec<bool> = (0..dims.len()).map(|i| dims.xy(i).0 == 20).collect();
        let terrain = TerrainMap::from_land(dims, &land);
        let mut set = CorridorSet::default();
        plan(&terrain, &cfg.corridors.sea, &cfg.corridors.policy.sea, &cfg.world_model.directionality, &mut set);
        assert!(set.of_kind(CorridorKind::Sea).all(|c| c.axis == Some(LaneAxis::Col)), "no row can cross the wall");
        assert!(set.of_kind(CorridorKind::Sea).flat_map(|c| &c.tiles).all(|t| terrain.is_water(t.plot)));
    }

    #[test]
    fn lane_tiles_near_land_are_coastal() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(30, 30);
        let land: Vec<bool> = (0..dims.len()).map(|i| dims.xy(i).1 == 0).collect();
        let terrain = TerrainMap::from_land(dims, &land);
        let mut set = CorridorSet::default();
        plan(&terrain, &cfg.corridors.sea, &cfg.corridors.policy.sea, &cfg.world_model.directionality, &mut set);
        for t in set.of_kind(CorridorKind::Sea).flat_map(|c| &c.tiles) {
            let expected = if terrain.near_land(t.plot, 2) { "coastal" } else { "ocean" };
            assert_eq!(t.style, expected);
        }
        assert!(set.tile_count(CorridorKind::Sea) > 0);
    }

    #[test]
    fn zero_lanes_requested_plans_nothing() {
        let cfg = resolve(&json!({ "corridors": { "sea": { "maxLanes": 0 } } })).unwrap();
        let mut set = CorridorSet::default();
        let n = plan(&open_sea(20, 20), &cfg.corridors.sea, &cfg.corridors.policy.sea, &cfg.world_model.directionality, &mut set);
        assert_eq!(n, 0);
        assert!(set.corridors.is_empty());
    }
}
