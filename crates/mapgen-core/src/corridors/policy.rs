//! Sea-lane protection for terrain edits.
//!
//! Every edit that could narrow water goes through `LaneGuard::try_raise`:
//! lane tiles near the edit are measured across their axis before and after,
//! and an edit leaving any lane narrower than `min_width` (and narrower than
//! it was) is refused.

use std::collections::BTreeMap;

use super::{CorridorKind, CorridorSet, LaneAxis};
use crate::config::{Protection, SeaPolicy};
use crate::grid::Dims;
use crate::landmass::TerrainMap;

#[derive(Debug, Clone)]
pub struct LaneGuard {
    dims: Dims,
    protection: Protection,
    soft_multiplier: f64,
    min_width: u32,
    /// Lane plot to the axis of its lane.
    lanes: BTreeMap<usize, LaneAxis>,
    rejected: usize,
}

impl LaneGuard {
    pub fn new(dims: Dims, corridors: &CorridorSet, policy: &SeaPolicy, min_width: u32) -> Self {
        let mut lanes = BTreeMap::new();
        for lane in corridors.of_kind(CorridorKind::Sea) {
            let axis = lane.axis.unwrap_or(LaneAxis::Row);
            for t in &lane.tiles {
                lanes.entry(t.plot).or_insert(axis);
            }
        }
        Self {
            dims,
            protection: policy.protection,
            soft_multiplier: policy.soft_chance_multiplier,
            min_width,
            lanes,
            rejected: 0,
        }
    }

    /// No lanes at all: every edit passes.
    pub fn open(dims: Dims) -> Self {
        Self {
            dims,
            protection: Protection::Soft,
            soft_multiplier: 1.0,
            min_width: 0,
            lanes: BTreeMap::new(),
            rejected: 0,
        }
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Plot `i` is a lane tile or touches one.
    pub fn near_lane(&self, i: usize) -> bool {
        self.dims.within(i, 1).any(|j| self.lanes.contains_key(&j))
    }

    /// Multiplier on the odds of a coastal edit at `i`; `None` when hard
    /// protection forbids it outright.
    pub fn edit_scale(&self, i: usize) -> Option<f64> {
        if !self.near_lane(i) {
            return Some(1.0);
        }
        match self.protection {
            Protection::Hard => None,
            Protection::Soft => Some(self.soft_multiplier),
        }
    }

    /// Raise `i` to land unless that would pinch a lane below the minimum
    /// width. Returns whether the edit happened.
    pub fn try_raise(&mut self, terrain: &mut TerrainMap, i: usize) -> bool {
        if terrain.is_land(i) {
            return true;
        }
        if !self.allows_raise(terrain, i) {
            self.rejected += 1;
            return false;
        }
        terrain.raise(i);
        true
    }

    fn allows_raise(&self, terrain: &TerrainMap, i: usize) -> bool {
        if self.min_width == 0 {
            return !self.lanes.contains_key(&i);
        }
        for j in self.dims.within(i, self.min_width) {
            let Some(&axis) = self.lanes.get(&j) else { continue };
            let before = self.width(terrain, j, axis, None);
            let after = self.width(terrain, j, axis, Some(i));
            if after < before && after < self.min_width {
                return false;
            }
        }
        true
    }

    /// Contiguous water across the lane at `plot`, capped at `min_width`.
    /// `blocked` is treated as land.
    pub fn width(&self, terrain: &TerrainMap, plot: usize, axis: LaneAxis, blocked: Option<usize>) -> u32 {
        let water = |p: usize| terrain.is_water(p) && Some(p) != blocked;
        if !water(plot) {
            return 0;
        }
        let cap = self.min_width.max(1);
        let (dx, dy) = axis.across();
        let mut w = 1;
        for sign in [1i64, -1] {
            let mut step = 1;
            while w < cap {
                match self.dims.offset(plot, dx * sign * step, dy * sign * step) {
                    Some(p) if water(p) => {
                        w += 1;
                        step += 1;
                    }
                    _ => break,
                }
            }
        }
        w
    }

    /// Narrowest lane tile, for reporting.
    pub fn narrowest(&self, terrain: &TerrainMap) -> Option<u32> {
        self.lanes.iter().map(|(&p, &axis)| self.width(terrain, p, axis, None)).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::corridors::{Corridor, CorridorTile};
    use serde_json::json;

    /// 20x9 map: land rows 0..=2 and 7..=8, a four-row channel between with a
    /// lane along row 4.
    fn channel() -> (Dims, TerrainMap, CorridorSet) {
        let dims = Dims::new(20, 9);
        let land: Vec<bool> = (0..dims.len())
            .map(|i| {
                let y = dims.xy(i).1;
                y <= 2 || y >= 7
            })
            .collect();
        let terrain = TerrainMap::from_land(dims, &land);
        let mut set = CorridorSet::default();
        set.push(Corridor {
            kind: CorridorKind::Sea,
            axis: Some(LaneAxis::Row),
            index: 4,
            protection: Some(Protection::Hard),
            biomes_bias_strength: 0.0,
            tiles: (0..20).map(|x| CorridorTile { plot: dims.idx(x, 4), style: "ocean".into() }).collect(),
        });
        (dims, terrain, set)
    }

    #[test]
    fn pinching_the_channel_is_refused() {
        let cfg = resolve(&json!({})).unwrap();
        let (dims, mut terrain, set) = channel();
        let mut guard = LaneGuard::new(dims, &set, &cfg.corridors.policy.sea, 4);
        assert_eq!(guard.narrowest(&terrain), Some(4));
        assert!(!guard.try_raise(&mut terrain, dims.idx(10, 3)), "row 3 is part of the 4-wide channel");
        assert!(terrain.is_water(dims.idx(10, 3)));
        assert_eq!(guard.rejected(), 1);
        assert_eq!(guard.narrowest(&terrain), Some(4));
    }

    #[test]
    fn edits_away_from_lanes_pass() {
        let cfg = resolve(&json!({})).unwrap();
        let (dims, mut terrain, set) = channel();
        let mut guard = LaneGuard::new(dims, &set, &cfg.corridors.policy.sea, 4);
        // land edits on land, and water far from lanes
        assert!(guard.try_raise(&mut terrain, dims.idx(3, 1)));
        let mut open = TerrainMap::ocean(dims);
        assert!(guard.try_raise(&mut open, dims.idx(0, 0)));
    }

    #[test]
    fn protection_modes_scale_edit_odds() {
        let (dims, _, set) = channel();
        let hard = resolve(&json!({})).unwrap();
        let soft = resolve(&json!({ "corridors": { "policy": { "sea": { "protection": "soft" } } } })).unwrap();
        let g_hard = LaneGuard::new(dims, &set, &hard.corridors.policy.sea, 4);
        let g_soft = LaneGuard::new(dims, &set, &soft.corridors.policy.sea, 4);
        let near = dims.idx(5, 3);
        assert_eq!(g_hard.edit_scale(near), None);
        assert_eq!(g_soft.edit_scale(near), Some(0.5));
        assert_eq!(g_hard.edit_scale(dims.idx(5, 0)), Some(1.0));
    }
}
