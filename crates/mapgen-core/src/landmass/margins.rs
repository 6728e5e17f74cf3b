//! Continental margins: coastal runs classified active (tectonically
//! energetic) or passive (stable shelf).

use super::TerrainMap;
use crate::config::MarginsConfig;
use crate::rng::{roll, stage_rng};
use crate::tags::MarginTags;

const SALT: u64 = 0x3A26_1B0E_77F0_44C1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginReport {
    pub target_active: usize,
    pub target_passive: usize,
    pub min_segment: usize,
}

pub fn tag_margins(terrain: &TerrainMap, cfg: &MarginsConfig, seed: u64, out: &mut MarginTags) -> MarginReport {
    let dims = terrain.dims;
    let s = dims.sqrt_scale();
    let active_frac = (cfg.active_fraction + 0.05 * (s - 1.0)).min(0.35);
    let passive_frac = (cfg.passive_fraction + 0.05 * (s - 1.0)).min(0.35);
    let min_segment = ((cfg.min_segment_length as f64 * (0.9 + 0.4 * s)).round() as usize).max(10);

    let coastal = (0..dims.len()).filter(|&i| terrain.is_coastal_land(i)).count();
    let target_active = (coastal as f64 * active_frac).floor() as usize;
    let target_passive = (coastal as f64 * passive_frac).floor() as usize;
    let report = MarginReport { target_active, target_passive, min_segment };
    if dims.width < 3 || dims.height < 3 {
        return report;
    }

    let mut rng = stage_rng(seed, SALT);
    let mut prefer_active = true;
    for y in 1..dims.height - 1 {
        let mut x = 1;
        while x < dims.width - 1 {
            while x < dims.width - 1 && !terrain.is_coastal_land(dims.idx(x, y)) {
                x += 1;
            }
            if x >= dims.width - 1 {
                break;
            }
            let start = x;
            while x < dims.width - 1 && terrain.is_coastal_land(dims.idx(x, y)) {
                x += 1;
            }
            if x - start < min_segment {
                continue;
            }

            let r = roll(&mut rng, 100);
            let pick_active = if prefer_active { r < 60 } else { r < 40 };
            let run = (start..x).map(|cx| dims.idx(cx, y));
            if pick_active && out.active.len() < target_active {
                mark(run, &mut out.active, target_active);
            } else if out.passive.len() < target_passive {
                mark(run, &mut out.passive, target_passive);
            }
            prefer_active = !prefer_active;
        }
    }

    tracing::debug!(
        active = out.active.len(),
        passive = out.passive.len(),
        target_active,
        target_passive,
        min_segment,
        "margins tagged"
    );
    report
}

fn mark(run: impl Iterator<Item = usize>, set: &mut std::collections::BTreeSet<usize>, target: usize) {
    for i in run {
        if set.len() >= target {
            break;
        }
        set.insert(i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::grid::Dims;
    use serde_json::json;

    /// Land south of row `split`, water above: one long straight coast.
    fn straight_coast(w: usize, h: usize, split: usize) -> TerrainMap {
        let dims = Dims::new(w, h);
        let land: Vec<bool> = (0..dims.len()).map(|i| dims.xy(i).1 >= split).collect();
        TerrainMap::from_land(dims, &land)
    }

    #[test]
    fn margins_respect_targets_and_stay_on_the_coast() {
        let cfg = resolve(&json!({ "margins": { "minSegmentLength": 4 } })).unwrap();
        let terrain = straight_coast(120, 40, 20);
        let mut tags = MarginTags::default();
        let r = tag_margins(&terrain, &cfg.margins, 3, &mut tags);
        assert!(tags.active.len() <= r.target_active);
        assert!(tags.passive.len() <= r.target_passive);
        assert!(tags.active.iter().chain(&tags.passive).all(|&i| terrain.is_coastal_land(i)));
        assert!(!tags.active.is_empty() || !tags.passive.is_empty(), "a 118-plot run must be classified");
    }

    #[test]
    fn short_runs_are_ignored() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(30, 30);
        let mut land = vec![false; dims.len()];
        for x in 10..14 {
            land[dims.idx(x, 15)] = true;
        }
        let terrain = TerrainMap::from_land(dims, &land);
        let mut tags = MarginTags::default();
        tag_margins(&terrain, &cfg.margins, 3, &mut tags);
        assert!(tags.active.is_empty() && tags.passive.is_empty());
    }
}
