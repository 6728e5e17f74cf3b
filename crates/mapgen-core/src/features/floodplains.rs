//! Floodplains: lowland river reaches cut into runs whose length falls in the
//! configured window. River corridors with a floodplain bias allow longer
//! runs.

use crate::config::ResolvedConfig;
use crate::corridors::{style_attrs_at, CorridorKind, CorridorSet};
use crate::grid::Surface;
use crate::landmass::TerrainMap;

const LOWLAND: f64 = 300.0;

/// Longest downhill chain of unvisited candidates starting at `start`.
fn trace(surface: &Surface, candidate: &[bool], seen: &mut [bool], start: usize) -> Vec<usize> {
    let dims = surface.dims;
    let mut chain = vec![start];
    seen[start] = true;
    let mut at = start;
    while let Some(next) = dims
        .neighbors(at)
        .filter(|&j| candidate[j] && !seen[j])
        .min_by(|&a, &b| surface.elevation[a].total_cmp(&surface.elevation[b]).then(a.cmp(&b)))
    {
        seen[next] = true;
        chain.push(next);
        at = next;
    }
    chain
}

pub fn tag_floodplains(
    surface: &Surface,
    terrain: &TerrainMap,
    corridors: &CorridorSet,
    cfg: &ResolvedConfig,
) -> Vec<Vec<usize>> {
    let dims = surface.dims;
    let window = &cfg.placement.floodplains;
    let min_len = window.min_length.max(1) as usize;
    let max_len = (window.max_length as usize).max(min_len);
    let candidate: Vec<bool> = (0..dims.len())
        .map(|i| terrain.is_land(i) && surface.river[i] && surface.elevation[i] < LOWLAND)
        .collect();

    let mut seen = vec![false; dims.len()];
    let mut runs = Vec::new();
    for start in 0..dims.len() {
        if !candidate[start] || seen[start] {
            continue;
        }
        let chain = trace(surface, &candidate, &mut seen, start);
        let bias = style_attrs_at(corridors, &cfg.corridors.kinds, start, CorridorKind::River)
            .map_or(0.0, |s| s.features.floodplain_bias.max(0.0));
        let cap = max_len + (max_len as f64 * bias).round() as usize;
        runs.extend(chain.chunks(cap).filter(|c| c.len() >= min_len).map(<[usize]>::to_vec));
    }

    tracing::debug!(runs = runs.len(), tiles = runs.iter().map(Vec::len).sum::<usize>(), "floodplains tagged");
    runs
}
