//! Story motifs: narrative geology and climate overlays tagged onto plots.
//!
//! Every motif is gated by its own toggle and reports a [`Motif`] summary. A
//! motif that finds no room degrades to an empty result; it never fails.

pub mod hotspots;
pub mod orogeny;
pub mod paleo;
pub mod rifts;
pub mod swatches;

pub use hotspots::{surface_volcanic_peaks, tag_hotspots};
pub use orogeny::tag_orogeny;
pub use paleo::apply_paleo;
pub use rifts::tag_rifts;
pub use swatches::{apply_monsoon, apply_swatches};

/// Outcome of one motif pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Motif {
    /// Elements placed (trails, lines, belts, swatches, channels).
    pub placed: usize,
    /// Plots tagged.
    pub tiles: usize,
    /// Elements the size-scaled caps allowed.
    pub requested: usize,
}

impl Motif {
    /// True when the motif was asked for something and placed nothing.
    pub fn degraded(&self) -> bool {
        self.requested > 0 && self.placed == 0
    }
}
