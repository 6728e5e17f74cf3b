//! Ecology: biome designation and nudges, then the per-plot indices the
//! feature resolver gates on.

pub mod biomes;
pub mod indices;

pub use biomes::{designate, nudge_biomes};
pub use indices::{classify, EcologyIndices};
