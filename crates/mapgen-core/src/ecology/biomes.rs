//! Biome designation from final rainfall, then the threshold nudges: tundra
//! restraint, tropical coasts, river valleys, corridor biases and rift
//! shoulders.

use crate::config::{CorridorStyle, ResolvedConfig, StyleBiomes};
use crate::corridors::{style_attrs_at, CorridorKind, CorridorSet};
use crate::grid::{per_plot, Biome, Surface};
use crate::landmass::TerrainMap;
use crate::rng::{chance, stage_rng, weighted_pick};
use crate::tags::StoryTags;

const SALT: u64 = 0xB10E_5EED_0000_0009;

// ── Designation ───────────────────────────────────────────────────────────────

/// Base biome per plot before any nudge. Land the engine already marked as
/// snow stays snow.
pub fn designate(surface: &Surface, terrain: &TerrainMap, rain: &[f64]) -> Vec<Biome> {
    per_plot(surface.dims.len(), |i| {
        if terrain.is_water(i) {
            return Biome::Marine;
        }
        let lat = surface.lat_of(i).abs();
        let elev = surface.elevation[i];
        let r = rain[i];
        if surface.biome[i] == Biome::Snow || lat >= 75.0 {
            Biome::Snow
        } else if lat >= 62.0 || (elev >= 1000.0 && lat >= 45.0) {
            Biome::Tundra
        } else if r < 40.0 {
            Biome::Desert
        } else if lat < 22.0 && r >= 100.0 {
            Biome::Tropical
        } else if r >= 85.0 {
            Biome::Grassland
        } else {
            Biome::Plains
        }
    })
}

// ── Nudges ────────────────────────────────────────────────────────────────────

fn percent(strength: f64) -> f64 {
    (strength.clamp(0.0, 1.0) * 100.0).round()
}

/// Style of the first land or river corridor through `i`.
fn bias_style<'a>(corridors: &CorridorSet, cfg: &'a ResolvedConfig, i: usize) -> Option<(CorridorKind, &'a CorridorStyle)> {
    [CorridorKind::Land, CorridorKind::River]
        .into_iter()
        .find_map(|kind| style_attrs_at(corridors, &cfg.corridors.kinds, i, kind).map(|s| (kind, s)))
}

/// Weighted draw over a style's biome map, in declaration order.
fn pick_biome<R: rand::Rng>(rng: &mut R, biomes: &StyleBiomes) -> Option<Biome> {
    let table = [
        (Biome::Desert, biomes.desert),
        (Biome::Plains, biomes.plains),
        (Biome::Grassland, biomes.grassland),
        (Biome::Tundra, biomes.tundra),
        (Biome::Tropical, biomes.tropical),
        (Biome::Snow, biomes.snow),
    ];
    let weights: Vec<f64> = table.iter().map(|(_, w)| *w).collect();
    weighted_pick(rng, &weights).map(|k| table[k].0)
}

/// Rejects corridor picks that clash with the local climate.
fn plausible(target: Biome, lat: f64, elev: f64, rain: f64) -> bool {
    match target {
        Biome::Desert => rain <= 110.0,
        Biome::Tropical => lat < 25.0 && rain > 95.0,
        Biome::Tundra => lat > 60.0 || elev > 800.0,
        Biome::Snow => lat > 70.0 || elev > 900.0,
        _ => true,
    }
}

/// Apply every nudge to land plots in row-major order. Returns the number of
/// plots whose biome changed.
#[allow(clippy::too_many_arguments)]
pub fn nudge_biomes(
    biome: &mut [Biome],
    surface: &Surface,
    terrain: &TerrainMap,
    rain: &[f64],
    tags: &StoryTags,
    corridors: &CorridorSet,
    cfg: &ResolvedConfig,
    seed: u64,
) -> usize {
    let dims = surface.dims;
    let rules = &cfg.biomes;
    let land_strength = cfg.corridors.policy.land.biomes_bias_strength;
    let river_strength = cfg.corridors.policy.river.biomes_bias_strength;
    let mut rng = stage_rng(seed, SALT);
    let before = biome.to_vec();

    let river_adjacent = |i: usize| surface.river[i] || dims.neighbors(i).any(|j| surface.river[j]);

    for i in 0..dims.len() {
        if terrain.is_water(i) {
            continue;
        }
        let lat = surface.lat_of(i).abs();
        let elev = surface.elevation[i];
        let r = rain[i];

        // tundra restraint locks the plot
        if (lat > rules.tundra.lat_min || elev > rules.tundra.elev_min) && r < rules.tundra.rain_max {
            biome[i] = Biome::Tundra;
            continue;
        }

        if lat < rules.tropical_coast.lat_max && terrain.is_coastal_land(i) && r > rules.tropical_coast.rain_min {
            biome[i] = Biome::Tropical;
        }
        if river_adjacent(i) && r > rules.river_valley_grassland.rain_min && lat < rules.river_valley_grassland.lat_max {
            biome[i] = Biome::Grassland;
        }

        let on_land = corridors.has_kind_at(i, CorridorKind::Land);
        let on_river = corridors.has_kind_at(i, CorridorKind::River);
        if on_land && r > 80.0 && lat < 55.0 && chance(&mut rng, percent(land_strength)) {
            biome[i] = Biome::Grassland;
        }
        if on_river && r > 75.0 && lat < 55.0 && chance(&mut rng, percent(river_strength)) {
            biome[i] = Biome::Grassland;
        }

        // rims beside land and river corridors
        if !on_land && !on_river {
            if let Some((_, style)) = dims.neighbors(i).find_map(|j| bias_style(corridors, cfg, j)) {
                let edge = &style.edge;
                let forest = edge.forest_rim_chance.clamp(0.0, 1.0);
                if forest > 0.0 && r > 90.0 && chance(&mut rng, percent(forest)) {
                    biome[i] = if lat < 22.0 && r > 110.0 { Biome::Tropical } else { Biome::Grassland };
                }
                let relief = edge.hill_rim_chance.max(0.0) + edge.mountain_rim_chance.max(0.0) + edge.escarpment_chance.max(0.0);
                if relief > 0.0 && chance(&mut rng, percent(relief)) {
                    biome[i] = if (lat > 62.0 || elev > 800.0) && r < 95.0 { Biome::Tundra } else { Biome::Plains };
                }
            }
        }

        // corridor style lottery
        if let Some((kind, style)) = bias_style(corridors, cfg, i) {
            let strength = if kind == CorridorKind::Land { land_strength } else { river_strength };
            if strength > 0.0 && chance(&mut rng, percent(strength)) {
                if let Some(target) = pick_biome(&mut rng, &style.biomes) {
                    if plausible(target, lat, elev, r) {
                        biome[i] = target;
                    }
                }
            }
        }

        if tags.rifts.shoulder.contains(&i) {
            let rs = &rules.rift_shoulder;
            if lat < rs.grassland_lat_max && r > rs.grassland_rain_min {
                biome[i] = Biome::Grassland;
            } else if lat < rs.tropical_lat_max && r > rs.tropical_rain_min {
                biome[i] = Biome::Tropical;
            }
        }
    }

    let changed = before.iter().zip(biome.iter()).filter(|(a, b)| a != b).count();
    tracing::debug!(changed, "biome nudges applied");
    changed
}
