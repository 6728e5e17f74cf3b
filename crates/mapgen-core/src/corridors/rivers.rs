//! River chains: downhill walks from the coast inland along existing rivers,
//! preferring lowland.

use rand::rngs::StdRng;

use super::{Corridor, CorridorKind, CorridorSet, CorridorTile};
use crate::config::{BiasPolicy, RiverCorridorConfig};
use crate::grid::Surface;
use crate::landmass::TerrainMap;
use crate::rng::{roll, stage_rng};

const SALT: u64 = 0x21BE_C4A1_0000_7712;
const MAX_TRIES: usize = 300;

fn river_within(surface: &Surface, i: usize, r: u32) -> bool {
    surface.dims.within(i, r).any(|j| surface.river[j])
}

/// Walk from `start` to ever lower (or lowland) river-side plots.
fn walk(surface: &Surface, terrain: &TerrainMap, start: usize, cfg: &RiverCorridorConfig, rng: &mut StdRng) -> Vec<usize> {
    let dims = surface.dims;
    let max_steps = (cfg.max_steps as usize).max(20);
    let lowland = cfg.prefer_lowland_below;
    let mut path = Vec::new();
    let mut current = start;
    for _ in 0..max_steps {
        if terrain.is_land(current) && river_within(surface, current, 1) && !path.contains(&current) {
            path.push(current);
        }
        let here = surface.elevation[current];
        let mut best: Option<usize> = None;
        for j in dims.neighbors(current) {
            if !terrain.is_land(j) || !river_within(surface, j, 1) || path.contains(&j) {
                continue;
            }
            let e = surface.elevation[j];
            let be = best.map_or(here, |b| surface.elevation[b]);
            if (e <= be || (e < lowland && be >= lowland)) && (best.is_none() || roll(rng, 3) == 0) {
                best = Some(j);
            }
        }
        match best {
            Some(next) => current = next,
            None => break,
        }
    }
    path
}

fn ends_near_coast(surface: &Surface, terrain: &TerrainMap, end: usize) -> bool {
    terrain.is_coastal_land(end) || surface.dims.neighbors(end).any(|j| terrain.is_shallow(j))
}

pub fn plan(
    surface: &Surface,
    terrain: &TerrainMap,
    cfg: &RiverCorridorConfig,
    policy: &BiasPolicy,
    seed: u64,
    out: &mut CorridorSet,
) -> usize {
    let dims = surface.dims;
    if cfg.max_chains == 0 {
        return 0;
    }
    let seeds: Vec<usize> = (0..dims.len())
        .filter(|&i| terrain.is_coastal_land(i) && river_within(surface, i, cfg.coast_seed_radius.max(1)))
        .collect();
    if seeds.is_empty() {
        return 0;
    }

    let mut rng = stage_rng(seed, SALT);
    let mut chains = 0;
    for _ in 0..MAX_TRIES {
        if chains >= cfg.max_chains as usize {
            break;
        }
        let start = seeds[roll(&mut rng, seeds.len() as u32) as usize];
        let path = walk(surface, terrain, start, cfg, &mut rng);
        let Some(&end) = path.last() else { continue };
        if path.len() < cfg.min_tiles as usize {
            continue;
        }
        if cfg.must_end_near_coast && !ends_near_coast(surface, terrain, end) {
            continue;
        }
        if path.iter().any(|&p| out.has_kind_at(p, CorridorKind::River)) {
            continue;
        }
        out.push(Corridor {
            kind: CorridorKind::River,
            axis: None,
            index: start as i64,
            protection: None,
            biomes_bias_strength: policy.biomes_bias_strength,
            tiles: path.into_iter().map(|plot| CorridorTile { plot, style: "riverChain".into() }).collect(),
        });
        chains += 1;
    }
    tracing::debug!(chains, seeds = seeds.len(), "river chains planned");
    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::grid::{Biome, Dims};
    use serde_json::json;

    /// Land east of column 2 rising eastward, with a river along row 5 that
    /// meets the sea on the west coast.
    fn river_valley() -> (Surface, TerrainMap) {
        let dims = Dims::new(40, 11);
        let land: Vec<bool> = (0..dims.len()).map(|i| dims.xy(i).0 >= 2).collect();
        let terrain = TerrainMap::from_land(dims, &land);
        let surface = Surface {
            dims,
            latitude: vec![20.0; dims.height],
            elevation: (0..dims.len()).map(|i| dims.xy(i).0 as f64 * 10.0).collect(),
            engine_rainfall: vec![100.0; dims.len()],
            river: (0..dims.len()).map(|i| dims.xy(i).1 == 5 && dims.xy(i).0 >= 2).collect(),
            wonder: vec![false; dims.len()],
            biome: vec![Biome::Plains; dims.len()],
            starts: Vec::new(),
        };
        (surface, terrain)
    }

    #[test]
    fn chains_hug_rivers_and_end_at_the_coast() {
        let cfg = resolve(&json!({ "corridors": { "river": { "minTiles": 2, "maxChains": 1 } } })).unwrap();
        let (surface, terrain) = river_valley();
        let mut set = CorridorSet::default();
        let n = plan(&surface, &terrain, &cfg.corridors.river, &cfg.corridors.policy.river, 4, &mut set);
        assert_eq!(n, 1);
        let chain = set.of_kind(CorridorKind::River).next().unwrap();
        assert!(chain.tiles.len() >= 2);
        for t in &chain.tiles {
            assert!(terrain.is_land(t.plot));
            assert!(river_within(&surface, t.plot, 1), "chain left the river at {}", t.plot);
            assert_eq!(t.style, "riverChain");
        }
    }

    #[test]
    fn no_rivers_no_chains() {
        let cfg = resolve(&json!({})).unwrap();
        let (mut surface, terrain) = river_valley();
        surface.river.iter_mut().for_each(|r| *r = false);
        let mut set = CorridorSet::default();
        assert_eq!(plan(&surface, &terrain, &cfg.corridors.river, &cfg.corridors.policy.river, 4, &mut set), 0);
    }
}
