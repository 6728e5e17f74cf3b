//! Per-plot story tags.
//!
//! Each motif stage receives `&mut` access to its own sub-set only, so a later
//! stage can read what earlier stages tagged but never rewrite it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

pub type PlotSet = BTreeSet<usize>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginTags {
    pub active: PlotSet,
    pub passive: PlotSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotKind {
    Paradise,
    Volcanic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotTrail {
    pub points: Vec<usize>,
    /// Middle point of the walk; carries the kind.
    pub center: usize,
    pub kind: HotspotKind,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HotspotTags {
    pub trails: Vec<HotspotTrail>,
    pub points: PlotSet,
    pub paradise: PlotSet,
    pub volcanic: PlotSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiftTags {
    pub lines: Vec<Vec<usize>>,
    pub line: PlotSet,
    pub shoulder: PlotSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrogenyTags {
    pub belts: Vec<Vec<usize>>,
    pub belt: PlotSet,
    pub windward: PlotSet,
    pub lee: PlotSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwatchTags {
    /// Swatch kinds in the order they were applied.
    pub applied: Vec<String>,
    pub tiles: PlotSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaleoTags {
    pub deltas: PlotSet,
    pub delta_marsh: PlotSet,
    pub oxbows: PlotSet,
    pub fossil_channels: PlotSet,
    pub canyon_rims: PlotSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryTags {
    pub margins: MarginTags,
    pub hotspots: HotspotTags,
    pub rifts: RiftTags,
    pub orogeny: OrogenyTags,
    pub swatches: SwatchTags,
    pub paleo: PaleoTags,
}

impl StoryTags {
    /// Tagged plot count per tag kind.
    pub fn summary(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("activeMargin", self.margins.active.len()),
            ("passiveShelf", self.margins.passive.len()),
            ("hotspotTrails", self.hotspots.trails.len()),
            ("hotspot", self.hotspots.points.len()),
            ("hotspotParadise", self.hotspots.paradise.len()),
            ("hotspotVolcanic", self.hotspots.volcanic.len()),
            ("riftLine", self.rifts.line.len()),
            ("riftShoulder", self.rifts.shoulder.len()),
            ("orogenyBelt", self.orogeny.belt.len()),
            ("orogenyWindward", self.orogeny.windward.len()),
            ("orogenyLee", self.orogeny.lee.len()),
            ("swatches", self.swatches.applied.len()),
            ("swatchTiles", self.swatches.tiles.len()),
            ("paleoDeltas", self.paleo.deltas.len()),
            ("paleoOxbows", self.paleo.oxbows.len()),
            ("paleoFossilChannels", self.paleo.fossil_channels.len()),
            ("paleoCanyonRims", self.paleo.canyon_rims.len()),
        ])
    }
}
