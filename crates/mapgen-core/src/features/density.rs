//! Story-driven density tweaks layered on the resolver output: reefs around
//! paradise hotspots and passive shelves, delta marshes, volcanic forest and
//! taiga, and extra rainforest/forest/taiga in climates that favour them.
//!
//! Every tweak only fills plots the resolver left bare.

use super::FeatureBoard;
use crate::config::{FeatureKey, ResolvedConfig};
use crate::corridors::{style_attrs_at, CorridorKind, CorridorSet};
use crate::grid::{Biome, Surface};
use crate::landmass::TerrainMap;
use crate::rng::{chance, stage_rng};
use crate::tags::StoryTags;

const SALT: u64 = 0xDE45_1770_0000_000B;

/// Reef chance multiplier from sea-lane and island-hop styles at `i`.
fn corridor_reef_scale(corridors: &CorridorSet, cfg: &ResolvedConfig, i: usize) -> f64 {
    [CorridorKind::Sea, CorridorKind::IslandHop]
        .into_iter()
        .filter_map(|kind| style_attrs_at(corridors, &cfg.corridors.kinds, i, kind))
        .map(|s| (1.0 + s.features.reef_bias.max(0.0)) * s.edge.shelf_reef_multiplier.max(0.0))
        .next()
        .unwrap_or(1.0)
}

/// Extra forest chance from a river corridor style at `i`, in percent.
fn corridor_forest_bonus(corridors: &CorridorSet, cfg: &ResolvedConfig, i: usize) -> f64 {
    style_attrs_at(corridors, &cfg.corridors.kinds, i, CorridorKind::River)
        .map_or(0.0, |s| s.features.forest_bias.max(0.0) * 100.0)
}

/// Apply every tweak in order. Returns the number of features added.
#[allow(clippy::too_many_arguments)]
pub fn apply_density(
    board: &mut FeatureBoard,
    surface: &Surface,
    terrain: &TerrainMap,
    biome: &[Biome],
    rain: &[f64],
    tags: &StoryTags,
    corridors: &CorridorSet,
    cfg: &ResolvedConfig,
    seed: u64,
) -> usize {
    let dims = surface.dims;
    let micro = &cfg.microclimate.features;
    let density = &cfg.features_density;
    let mut rng = stage_rng(seed, SALT);
    let before = board.count();

    // paradise reefs
    if micro.paradise_reef_chance > 0.0 {
        for &c in &tags.hotspots.paradise {
            for j in dims.within(c, 2) {
                if terrain.is_water(j) && board.is_free(j) && chance(&mut rng, micro.paradise_reef_chance) {
                    board.place(j, FeatureKey::Reef);
                }
            }
        }
    }

    // passive shelf reefs, lifted along reef-biased corridors and archipelago swatches
    if !tags.margins.passive.is_empty() {
        let shelf = (micro.paradise_reef_chance * density.shelf_reef_multiplier).floor().clamp(1.0, 100.0);
        let archipelago = tags.swatches.applied.iter().any(|k| k == "rainforestArchipelago");
        let swatch_bias = cfg.story.swatches.types.rainforest_archipelago.reef_bias.max(0.0);
        for &s in &tags.margins.passive {
            for j in dims.within(s, 1) {
                if !terrain.is_water(j) || !board.is_free(j) {
                    continue;
                }
                let mut p = shelf * corridor_reef_scale(corridors, cfg, j);
                if archipelago && dims.within(j, 1).any(|k| tags.swatches.tiles.contains(&k)) {
                    p *= swatch_bias;
                }
                if chance(&mut rng, p.clamp(0.0, 100.0)) {
                    board.place(j, FeatureKey::Reef);
                }
            }
        }
    }

    // delta fans the paleo pass marked as marshy
    for &i in &tags.paleo.delta_marsh {
        if terrain.is_land(i) {
            board.place(i, FeatureKey::Marsh);
        }
    }

    let volcanic_forest = (micro.volcanic_forest_chance + 6.0).min(100.0);
    let volcanic_taiga = (micro.volcanic_taiga_chance + 5.0).min(100.0);
    for i in 0..dims.len() {
        if terrain.is_water(i) || !board.is_free(i) {
            continue;
        }
        let b = biome[i];
        let r = rain[i];
        let elev = surface.elevation[i];
        let lat = surface.lat_of(i).abs();

        if dims.neighbors(i).any(|j| tags.hotspots.volcanic.contains(&j)) {
            if r > 95.0 && matches!(b, Biome::Grassland | Biome::Tropical) && chance(&mut rng, volcanic_forest) {
                board.place(i, FeatureKey::Forest);
                continue;
            }
            if lat >= 55.0 && b == Biome::Tundra && elev < 400.0 && r > 60.0 && chance(&mut rng, volcanic_taiga) {
                board.place(i, FeatureKey::Taiga);
                continue;
            }
        }

        if b == Biome::Tropical && r > 130.0 && chance(&mut rng, density.rainforest_extra_chance) {
            board.place(i, FeatureKey::Rainforest);
            continue;
        }
        if b == Biome::Grassland && r > 100.0 {
            let p = (density.forest_extra_chance + corridor_forest_bonus(corridors, cfg, i)).min(100.0);
            if chance(&mut rng, p) {
                board.place(i, FeatureKey::Forest);
                continue;
            }
        }
        if b == Biome::Tundra && elev < 300.0 && chance(&mut rng, density.taiga_extra_chance) {
            board.place(i, FeatureKey::Taiga);
        }
    }

    let added = board.count() - before;
    tracing::debug!(added, "feature density tweaks applied");
    added
}
