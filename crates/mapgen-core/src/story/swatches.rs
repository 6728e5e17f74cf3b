//! Macro climate swatches: a weighted lottery picks a few climate zones and
//! each one nudges rainfall over its footprint, bleeding out softly past its
//! edge.

use super::Motif;
use crate::config::{DirectionalityConfig, SwatchTypes, SwatchesConfig};
use crate::grid::Surface;
use crate::landmass::TerrainMap;
use crate::rng::{roll, stage_rng, weighted_pick};
use crate::tags::{OrogenyTags, SwatchTags};
use crate::world::directionality::unit;
use crate::world::WorldModel;

const SALT: u64 = 0x5A7C_4E50_0000_C0DE;

/// Rainfall deltas one swatch kind would apply, keyed by plot.
type Footprint = Vec<Option<f64>>;

#[derive(Debug, Clone, Copy)]
struct Env<'a> {
    surface: &'a Surface,
    terrain: &'a TerrainMap,
    orogeny: &'a OrogenyTags,
    width_mul: f64,
}

impl Env<'_> {
    fn abs_lat(&self, i: usize) -> f64 {
        self.surface.lat_of(i).abs()
    }

    fn shallow_adjacent(&self, i: usize) -> bool {
        self.terrain.dims.neighbors(i).any(|j| self.terrain.is_shallow(j))
    }

    fn land(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.terrain.dims.len()).filter(|&i| self.terrain.is_land(i))
    }
}

fn falloff(distance: f64, radius: f64) -> f64 {
    (1.0 - distance / radius.max(1.0)).max(0.0)
}

/// Kind names with their lottery weights, nudged toward the macro axes.
fn lottery(types: &SwatchTypes, dir: &DirectionalityConfig) -> Vec<(String, f64)> {
    let coh = dir.cohesion.clamp(0.0, 1.0);
    let zonal = unit(dir.primary_axes.wind_bias_deg.trunc()).0.abs();
    let plate = unit(dir.primary_axes.plate_axis_deg.trunc()).0.abs();
    let mut out = vec![
        ("macroDesertBelt".to_string(), types.macro_desert_belt.weight * (1.0 + 0.4 * coh * zonal)),
        ("equatorialRainbelt".to_string(), types.equatorial_rainbelt.weight * (1.0 + 0.25 * coh * zonal)),
        ("rainforestArchipelago".to_string(), types.rainforest_archipelago.weight),
        ("mountainForests".to_string(), types.mountain_forests.weight * (1.0 + 0.2 * coh * plate)),
        ("greatPlains".to_string(), types.great_plains.weight * (1.0 + 0.2 * coh * zonal)),
    ];
    out.extend(types.custom.iter().map(|(name, c)| (name.clone(), c.weight)));
    out
}

/// Per-plot deltas of `kind` before bleeding, and its bleed radius.
fn footprint(env: &Env<'_>, types: &SwatchTypes, kind: &str) -> Option<(Footprint, u32)> {
    let surface = env.surface;
    let n = surface.dims.len();
    let mut fp: Footprint = vec![None; n];
    let band_half = |hw: f64, min: f64| (hw * env.width_mul).round().max(min);

    let bleed = match kind {
        "macroDesertBelt" => {
            let t = &types.macro_desert_belt;
            let hw = band_half(t.half_width_deg, 4.0);
            for i in env.land() {
                let f = falloff((env.abs_lat(i) - t.latitude_center_deg).abs(), hw);
                if f > 0.0 {
                    let lowland = if surface.elevation[i] < 250.0 { 4.0 } else { 0.0 };
                    fp[i] = Some(-((t.dryness_delta + lowland) * f).round());
                }
            }
            t.bleed_radius
        }
        "equatorialRainbelt" => {
            let t = &types.equatorial_rainbelt;
            let hw = band_half(t.half_width_deg, 4.0);
            for i in env.land() {
                let f = falloff((env.abs_lat(i) - t.latitude_center_deg).abs(), hw);
                if f > 0.0 {
                    let mut coast = 0.0;
                    if env.terrain.is_coastal_land(i) {
                        coast += 6.0;
                    }
                    if env.shallow_adjacent(i) {
                        coast += 4.0;
                    }
                    fp[i] = Some(((t.wetness_delta + coast) * f).round());
                }
            }
            t.bleed_radius
        }
        "rainforestArchipelago" => {
            let t = &types.rainforest_archipelago;
            for i in env.land() {
                let lat = env.abs_lat(i);
                let tropics = if lat < 23.0 { 1.0 } else if lat < 30.0 { 0.5 } else { 0.0 };
                let mut islandy = 0.0;
                if env.terrain.is_coastal_land(i) {
                    islandy += 0.5 * t.island_bias;
                }
                if env.shallow_adjacent(i) {
                    islandy += 0.5;
                }
                if tropics > 0.0 && islandy > 0.0 {
                    fp[i] = Some((t.wetness_delta * tropics * islandy).round());
                }
            }
            t.bleed_radius
        }
        "mountainForests" => {
            let t = &types.mountain_forests;
            for i in env.land() {
                let elev = surface.elevation[i];
                if t.couple_to_orogeny {
                    if env.orogeny.windward.contains(&i) {
                        fp[i] = Some(t.windward_bonus + if elev < 300.0 { 2.0 } else { 0.0 });
                    } else if env.orogeny.lee.contains(&i) {
                        fp[i] = Some(-t.lee_penalty);
                    }
                } else if elev >= 500.0 {
                    fp[i] = Some(t.windward_bonus);
                }
            }
            t.bleed_radius
        }
        "greatPlains" => {
            let t = &types.great_plains;
            let hw = band_half(t.half_width_deg, 6.0);
            for i in env.land() {
                let f = falloff((env.abs_lat(i) - t.latitude_center_deg).abs(), hw);
                if f > 0.0 && surface.elevation[i] <= t.lowland_max_elevation {
                    fp[i] = Some(-(t.dry_delta * f).round());
                }
            }
            t.bleed_radius
        }
        custom => {
            let t = types.custom.get(custom)?;
            let hw = band_half(t.half_width_deg, 4.0);
            let net = t.wetness_delta - t.dryness_delta;
            for i in env.land() {
                let f = falloff((env.abs_lat(i) - t.latitude_center_deg).abs(), hw);
                if f > 0.0 && net != 0.0 {
                    fp[i] = Some((net * f).round());
                }
            }
            t.bleed_radius
        }
    };
    Some((fp, bleed))
}

/// Land plots within `radius` of the footprint take a fading share of the
/// nearest footprint delta.
fn bleed(env: &Env<'_>, fp: &Footprint, radius: u32) -> Vec<(usize, f64)> {
    let dims = env.terrain.dims;
    let mut out = Vec::new();
    if radius == 0 {
        return out;
    }
    for i in env.land().filter(|&i| fp[i].is_none()) {
        let nearest = dims
            .within(i, radius)
            .filter_map(|j| fp[j].map(|d| (dims.chebyshev(i, j), d)))
            .min_by_key(|&(dist, _)| dist);
        if let Some((dist, d)) = nearest {
            let share = falloff(dist as f64, radius as f64 + 1.0);
            let v = (d * share).round();
            if v != 0.0 {
                out.push((i, v));
            }
        }
    }
    out
}

#[allow(clippy::too_many_arguments)]
pub fn apply_swatches(
    rain: &mut [f64],
    surface: &Surface,
    terrain: &TerrainMap,
    orogeny: &OrogenyTags,
    cfg: &SwatchesConfig,
    dir: &DirectionalityConfig,
    seed: u64,
    out: &mut SwatchTags,
) -> Motif {
    let s = surface.dims.sqrt_scale();
    let env = Env {
        surface,
        terrain,
        orogeny,
        width_mul: 1.0 + cfg.size_scaling.width_mul_sqrt * (s - 1.0),
    };
    let length_mul = (1.0 + cfg.size_scaling.length_mul_sqrt * (s - 1.0)).max(0.0);
    let mut rng = stage_rng(seed, SALT);

    let mut pool = lottery(&cfg.types, dir);
    let eligible = pool.iter().filter(|(_, w)| *w > 0.0).count();
    let mut picks = roll(&mut rng, cfg.max_per_map + 1) as usize;
    if cfg.force_at_least_one && cfg.max_per_map > 0 {
        picks = picks.max(1);
    }
    let picks = picks.min(eligible);

    for _ in 0..picks {
        let weights: Vec<f64> = pool.iter().map(|(_, w)| *w).collect();
        let Some(k) = weighted_pick(&mut rng, &weights) else { break };
        let (kind, _) = pool.remove(k);
        let Some((fp, radius)) = footprint(&env, &cfg.types, &kind) else { continue };
        let radius = (radius as f64 * length_mul).round() as u32;

        let halo = bleed(&env, &fp, radius);
        for (i, d) in fp.iter().enumerate() {
            if let Some(d) = d {
                rain[i] = (rain[i] + d).clamp(0.0, 200.0);
                out.tiles.insert(i);
            }
        }
        for (i, d) in halo {
            rain[i] = (rain[i] + d).clamp(0.0, 200.0);
            out.tiles.insert(i);
        }
        tracing::debug!(kind = %kind, radius, "swatch applied");
        out.applied.push(kind);
    }

    Motif { placed: out.applied.len(), tiles: out.tiles.len(), requested: picks }
}

/// Coastal lowlands near the equator take a small onshore-wind humidity bump.
pub fn apply_monsoon(rain: &mut [f64], surface: &Surface, terrain: &TerrainMap, world: &WorldModel, dir: &DirectionalityConfig) -> usize {
    let monsoon = dir.hemispheres.monsoon_bias.clamp(0.0, 1.0);
    let coh = dir.cohesion.clamp(0.0, 1.0);
    if !world.enabled || monsoon <= 0.0 || coh <= 0.0 {
        return 0;
    }
    let dims = surface.dims;
    let eq_band = dir.hemispheres.equator_band_deg.max(0.0).trunc();
    let base = (3.0 * coh * monsoon).round().max(1.0);
    let mut touched = 0;
    for i in 0..dims.len() {
        let lat = surface.lat_of(i).abs();
        if lat > eq_band + 18.0 || !terrain.is_land(i) {
            continue;
        }
        if !terrain.is_coastal_land(i) && !dims.neighbors(i).any(|j| terrain.is_shallow(j)) {
            continue;
        }
        // onshore when the plot the wind arrives from is water
        let (ux, vy) = world.wind_step(i, surface.lat_of(i));
        let onshore = dims.offset(i, -ux, -vy).is_some_and(|up| terrain.is_water(up));
        let mut delta = base;
        if lat <= eq_band {
            delta += 2.0;
        }
        if onshore {
            delta += 1.0;
        }
        rain[i] = (rain[i] + delta).clamp(0.0, 200.0);
        touched += 1;
    }
    tracing::debug!(touched, "monsoon bias applied");
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::grid::{Biome, Dims};
    use serde_json::json;

    /// All land, latitude running 60 at the top row to -60 at the bottom.
    fn continent(dims: Dims) -> (Surface, TerrainMap) {
        let h = dims.height as f64;
        let surface = Surface {
            dims,
            latitude: (0..dims.height).map(|y| 60.0 - 120.0 * y as f64 / (h - 1.0)).collect(),
            elevation: vec![200.0; dims.len()],
            engine_rainfall: vec![100.0; dims.len()],
            river: vec![false; dims.len()],
            wonder: vec![false; dims.len()],
            biome: vec![Biome::Plains; dims.len()],
            starts: Vec::new(),
        };
        let terrain = TerrainMap::from_land(dims, &vec![true; dims.len()]);
        (surface, terrain)
    }

    #[test]
    fn forced_desert_belt_dries_the_subtropics() {
        let cfg = resolve(&json!({ "story": { "swatches": { "maxPerMap": 1, "types": {
            "equatorialRainbelt": { "weight": 0 }, "rainforestArchipelago": { "weight": 0 },
            "mountainForests": { "weight": 0 }, "greatPlains": { "weight": 0 }
        } } } }))
        .unwrap();
        let dims = Dims::new(20, 61);
        let (surface, terrain) = continent(dims);
        let mut rain = vec![100.0; dims.len()];
        let mut tags = SwatchTags::default();
        let motif = apply_swatches(
            &mut rain,
            &surface,
            &terrain,
            &OrogenyTags::default(),
            &cfg.story.swatches,
            &cfg.world_model.directionality,
            5,
            &mut tags,
        );
        assert_eq!(motif.placed, 1);
        assert_eq!(tags.applied, vec!["macroDesertBelt".to_string()]);
        // row 40 sits at -20 degrees: the belt centre
        let centre = rain[dims.idx(5, 40)];
        assert!(centre < 100.0 - 20.0, "belt centre should dry sharply, got {centre}");
        // the equator row is outside the belt and its bleed
        assert_eq!(rain[dims.idx(5, 30)], 100.0);
        assert!(rain.iter().all(|r| (0.0..=200.0).contains(r)));
    }

    #[test]
    fn custom_band_applies_net_delta() {
        let cfg = resolve(&json!({ "story": { "swatches": { "maxPerMap": 1, "types": {
            "macroDesertBelt": { "weight": 0 }, "equatorialRainbelt": { "weight": 0 },
            "rainforestArchipelago": { "weight": 0 }, "mountainForests": { "weight": 0 },
            "greatPlains": { "weight": 0 },
            "custom": { "fogBelt": { "weight": 1, "latitudeCenterDeg": 0, "halfWidthDeg": 10,
                "wetnessDelta": 20, "drynessDelta": 5, "bleedRadius": 0 } }
        } } } }))
        .unwrap();
        let dims = Dims::new(10, 61);
        let (surface, terrain) = continent(dims);
        let mut rain = vec![100.0; dims.len()];
        let mut tags = SwatchTags::default();
        apply_swatches(
            &mut rain,
            &surface,
            &terrain,
            &OrogenyTags::default(),
            &cfg.story.swatches,
            &cfg.world_model.directionality,
            5,
            &mut tags,
        );
        assert_eq!(tags.applied, vec!["fogBelt".to_string()]);
        assert_eq!(rain[dims.idx(3, 30)], 115.0);
        assert_eq!(rain[dims.idx(3, 0)], 100.0);
    }

    #[test]
    fn nothing_applies_when_every_weight_is_zero() {
        let cfg = resolve(&json!({ "story": { "swatches": { "types": {
            "macroDesertBelt": { "weight": 0 }, "equatorialRainbelt": { "weight": 0 },
            "rainforestArchipelago": { "weight": 0 }, "mountainForests": { "weight": 0 },
            "greatPlains": { "weight": 0 }
        } } } }))
        .unwrap();
        let dims = Dims::new(10, 20);
        let (surface, terrain) = continent(dims);
        let mut rain = vec![100.0; dims.len()];
        let mut tags = SwatchTags::default();
        let motif = apply_swatches(
            &mut rain,
            &surface,
            &terrain,
            &OrogenyTags::default(),
            &cfg.story.swatches,
            &cfg.world_model.directionality,
            5,
            &mut tags,
        );
        assert_eq!(motif.placed, 0);
        assert!(rain.iter().all(|r| *r == 100.0));
    }
}
