//! Island-hop arcs: hotspot trails promoted to archipelago corridors.

use super::{Corridor, CorridorKind, CorridorSet, CorridorTile};
use crate::config::IslandHopConfig;
use crate::landmass::TerrainMap;
use crate::rng::{roll, stage_rng};
use crate::tags::HotspotTags;

const SALT: u64 = 0xC011_D07A_1500_0001;

pub fn plan(terrain: &TerrainMap, hotspots: &HotspotTags, cfg: &IslandHopConfig, seed: u64, out: &mut CorridorSet) -> usize {
    if !cfg.use_hotspots || cfg.max_arcs == 0 || hotspots.trails.is_empty() {
        return 0;
    }
    let dims = terrain.dims;
    let mut rng = stage_rng(seed, SALT);
    let mut remaining: Vec<usize> = (0..hotspots.trails.len()).collect();
    let mut arcs = 0;
    while arcs < cfg.max_arcs as usize && !remaining.is_empty() {
        let pick = remaining.swap_remove(roll(&mut rng, remaining.len() as u32) as usize);
        let trail = &hotspots.trails[pick];

        let mut plots: Vec<usize> = trail
            .points
            .iter()
            .flat_map(|&p| dims.within(p, 1))
            .filter(|&j| terrain.is_water(j))
            .collect();
        plots.sort_unstable();
        plots.dedup();
        if plots.is_empty() {
            continue;
        }
        out.push(Corridor {
            kind: CorridorKind::IslandHop,
            axis: None,
            index: pick as i64,
            protection: None,
            biomes_bias_strength: 0.0,
            tiles: plots.into_iter().map(|plot| CorridorTile { plot, style: "archipelago".into() }).collect(),
        });
        arcs += 1;
    }
    tracing::debug!(arcs, "island-hop arcs planned");
    arcs
}
