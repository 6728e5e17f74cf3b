//! Strategic corridors: sea lanes, island-hop arcs, open land belts and river
//! chains.
//!
//! Sea lanes, island-hop arcs and land belts are planned before island
//! seeding; river chains after the baseline climate. Every corridor tile
//! carries a style whose biome/feature/edge biases later stages read as soft
//! nudges.

pub mod island_hop;
pub mod land;
pub mod policy;
pub mod rivers;
pub mod sea_lanes;

pub use policy::LaneGuard;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{CorridorKinds, CorridorStyle, Protection};
use crate::grid::Dims;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorridorKind {
    Sea,
    IslandHop,
    Land,
    River,
}

impl CorridorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CorridorKind::Sea => "sea",
            CorridorKind::IslandHop => "islandHop",
            CorridorKind::Land => "land",
            CorridorKind::River => "river",
        }
    }
}

/// Direction a sea lane runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LaneAxis {
    /// Along a column (north-south).
    Col,
    /// Along a row (east-west).
    Row,
    /// Along `x + y = k`, running south-west to north-east.
    DiagNe,
    /// Along `x - y = d`, running north-west to south-east.
    DiagNw,
}

impl LaneAxis {
    /// Unit step along the lane, `y` pointing south.
    pub fn along(self) -> (f64, f64) {
        match self {
            LaneAxis::Col => (0.0, 1.0),
            LaneAxis::Row => (1.0, 0.0),
            LaneAxis::DiagNe => (std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
            LaneAxis::DiagNw => (std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
        }
    }

    /// Grid step across the lane.
    pub fn across(self) -> (i64, i64) {
        match self {
            LaneAxis::Col => (1, 0),
            LaneAxis::Row => (0, 1),
            LaneAxis::DiagNe => (1, 1),
            LaneAxis::DiagNw => (1, -1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorridorTile {
    pub plot: usize,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corridor {
    pub kind: CorridorKind,
    /// Sea lanes only.
    pub axis: Option<LaneAxis>,
    /// Row, column or diagonal index the lane was scanned on.
    pub index: i64,
    pub protection: Option<Protection>,
    pub biomes_bias_strength: f64,
    pub tiles: Vec<CorridorTile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorridorSet {
    pub corridors: Vec<Corridor>,
    /// Plot to the corridors passing through it.
    #[serde(skip)]
    by_plot: BTreeMap<usize, Vec<usize>>,
}

impl CorridorSet {
    pub fn push(&mut self, corridor: Corridor) {
        let id = self.corridors.len();
        for t in &corridor.tiles {
            self.by_plot.entry(t.plot).or_default().push(id);
        }
        self.corridors.push(corridor);
    }

    pub fn of_kind(&self, kind: CorridorKind) -> impl Iterator<Item = &Corridor> + '_ {
        self.corridors.iter().filter(move |c| c.kind == kind)
    }

    /// Corridors through plot `i`.
    pub fn at(&self, i: usize) -> impl Iterator<Item = &Corridor> + '_ {
        self.by_plot.get(&i).into_iter().flatten().map(move |&id| &self.corridors[id])
    }

    pub fn has_kind_at(&self, i: usize, kind: CorridorKind) -> bool {
        self.at(i).any(|c| c.kind == kind)
    }

    /// Style name of the first `kind` corridor through plot `i`.
    pub fn style_at(&self, i: usize, kind: CorridorKind) -> Option<&str> {
        self.at(i)
            .filter(|c| c.kind == kind)
            .flat_map(|c| c.tiles.iter())
            .find(|t| t.plot == i)
            .map(|t| t.style.as_str())
    }

    /// Any sea-lane tile within Chebyshev `radius` of `i`.
    pub fn sea_lane_within(&self, dims: Dims, i: usize, radius: u32) -> bool {
        dims.within(i, radius).any(|j| self.has_kind_at(j, CorridorKind::Sea))
    }

    /// Largest `biomesBiasStrength` among corridors through `i`.
    pub fn bias_strength_at(&self, i: usize) -> f64 {
        self.at(i).map(|c| c.biomes_bias_strength).fold(0.0, f64::max)
    }

    pub fn tile_count(&self, kind: CorridorKind) -> usize {
        self.by_plot.keys().filter(|&&i| self.has_kind_at(i, kind)).count()
    }

    /// Corridor and tile counts per kind.
    pub fn summary(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        for kind in [CorridorKind::Sea, CorridorKind::IslandHop, CorridorKind::Land, CorridorKind::River] {
            out.insert(format!("{}Corridors", kind.as_str()), self.of_kind(kind).count());
            out.insert(format!("{}Tiles", kind.as_str()), self.tile_count(kind));
        }
        out
    }
}

/// Attributes of a named style, built-in keys first, then the `custom` slot.
pub fn style_of<'a>(kinds: &'a CorridorKinds, kind: CorridorKind, name: &str) -> Option<&'a CorridorStyle> {
    match kind {
        CorridorKind::Sea => {
            let s = &kinds.sea.styles;
            match name {
                "ocean" => Some(&s.ocean),
                "coastal" => Some(&s.coastal),
                other => s.custom.get(other),
            }
        }
        CorridorKind::IslandHop => {
            let s = &kinds.island_hop.styles;
            match name {
                "archipelago" => Some(&s.archipelago),
                other => s.custom.get(other),
            }
        }
        CorridorKind::Land => {
            let s = &kinds.land.styles;
            match name {
                "desertBelt" => Some(&s.desert_belt),
                "plainsBelt" => Some(&s.plains_belt),
                "grasslandBelt" => Some(&s.grassland_belt),
                "canyon" => Some(&s.canyon),
                "plateau" => Some(&s.plateau),
                "flatMtn" => Some(&s.flat_mtn),
                other => s.custom.get(other),
            }
        }
        CorridorKind::River => {
            let s = &kinds.river.styles;
            match name {
                "riverChain" => Some(&s.river_chain),
                other => s.custom.get(other),
            }
        }
    }
}

/// Style attributes of the first `kind` corridor through plot `i`.
pub fn style_attrs_at<'a>(
    set: &CorridorSet,
    kinds: &'a CorridorKinds,
    i: usize,
    kind: CorridorKind,
) -> Option<&'a CorridorStyle> {
    set.style_at(i, kind).and_then(|name| style_of(kinds, kind, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;

    fn lane(tiles: &[usize], style: &str) -> Corridor {
        Corridor {
            kind: CorridorKind::Sea,
            axis: Some(LaneAxis::Row),
            index: 0,
            protection: Some(Protection::Hard),
            biomes_bias_strength: 0.0,
            tiles: tiles.iter().map(|&plot| CorridorTile { plot, style: style.into() }).collect(),
        }
    }

    #[test]
    fn lookups_by_plot() {
        let mut set = CorridorSet::default();
        set.push(lane(&[1, 2, 3], "ocean"));
        assert!(set.has_kind_at(2, CorridorKind::Sea));
        assert!(!set.has_kind_at(2, CorridorKind::Land));
        assert_eq!(set.style_at(3, CorridorKind::Sea), Some("ocean"));
        assert_eq!(set.tile_count(CorridorKind::Sea), 3);
        assert_eq!(set.summary()["seaCorridors"], 1);
    }

    #[test]
    fn custom_styles_resolve_through_the_extension_slot() {
        let cfg = resolve(&json!({ "corridors": { "kinds": { "sea": { "styles": { "custom": {
            "stormStrait": { "edge": { "fjordChance": 0.4 } }
        } } } } } }))
        .unwrap();
        let kinds = &cfg.corridors.kinds;
        let s = style_of(kinds, CorridorKind::Sea, "stormStrait").expect("custom style");
        assert!((s.edge.fjord_chance - 0.4).abs() < 1e-12);
        assert!(style_of(kinds, CorridorKind::Sea, "nope").is_none());
        assert!(style_of(kinds, CorridorKind::Land, "canyon").is_some());
    }

    #[test]
    fn lane_proximity_uses_chebyshev_radius() {
        let dims = Dims::new(10, 10);
        let mut set = CorridorSet::default();
        set.push(lane(&[dims.idx(5, 5)], "ocean"));
        assert!(set.sea_lane_within(dims, dims.idx(7, 7), 2));
        assert!(!set.sea_lane_within(dims, dims.idx(8, 5), 2));
    }
}
