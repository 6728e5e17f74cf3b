//! Feature placement: the resolver passes (ice, reefs, atolls, lotus,
//! wetlands, vegetated scatter), the story density tweaks, and floodplain
//! runs.
//!
//! A plot takes at most one feature. Nothing overwrites a feature or touches a
//! natural wonder.

pub mod density;
pub mod floodplains;

pub use density::apply_density;
pub use floodplains::tag_floodplains;

use std::collections::BTreeMap;

use rand::Rng;

use crate::config::{BiomeSymbol, FeatureKey, FeaturesPlacementConfig, VegetatedRules};
use crate::ecology::EcologyIndices;
use crate::grid::{Dims, Surface};
use crate::landmass::TerrainMap;
use crate::rng::{chance, stage_rng};

const SALT: u64 = 0xFEA7_0000_0000_000A;

// ── Board ─────────────────────────────────────────────────────────────────────

/// Per-plot feature field plus the write rules every pass shares.
#[derive(Debug, Clone)]
pub struct FeatureBoard {
    pub dims: Dims,
    pub field: Vec<Option<FeatureKey>>,
    wonder: Vec<bool>,
}

impl FeatureBoard {
    pub fn new(surface: &Surface) -> Self {
        Self { dims: surface.dims, field: vec![None; surface.dims.len()], wonder: surface.wonder.clone() }
    }

    #[inline]
    pub fn is_free(&self, i: usize) -> bool {
        self.field[i].is_none() && !self.wonder[i]
    }

    /// Write `key` at `i` if the plot is still free.
    pub fn place(&mut self, i: usize, key: FeatureKey) -> bool {
        if !self.is_free(i) {
            return false;
        }
        self.field[i] = Some(key);
        true
    }

    /// `key` within `radius` of `i`, not counting `i` itself.
    pub fn has_near(&self, i: usize, key: FeatureKey, radius: u32) -> bool {
        radius > 0 && self.dims.within(i, radius).any(|j| j != i && self.field[j] == Some(key))
    }

    pub fn wonder_near(&self, i: usize, radius: u32) -> bool {
        radius > 0 && self.dims.within(i, radius).any(|j| j != i && self.wonder[j])
    }

    pub fn count(&self) -> usize {
        self.field.iter().filter(|f| f.is_some()).count()
    }

    /// Placed plots per feature key.
    pub fn histogram(&self) -> BTreeMap<&'static str, usize> {
        let mut out = BTreeMap::new();
        for key in self.field.iter().flatten() {
            *out.entry(key.as_str()).or_insert(0) += 1;
        }
        out
    }
}

// ── Vegetated choice ──────────────────────────────────────────────────────────

/// Vegetated feature a plot would carry, if any.
pub fn pick_vegetated(
    symbol: BiomeSymbol,
    moisture: f64,
    temperature: f64,
    vegetation: f64,
    aridity: f64,
    freeze: f64,
    rules: &VegetatedRules,
) -> Option<FeatureKey> {
    match symbol {
        BiomeSymbol::Snow => None,
        BiomeSymbol::Desert => (vegetation > rules.desert_sagebrush_min_vegetation
            && aridity <= rules.desert_sagebrush_max_aridity)
            .then_some(FeatureKey::SagebrushSteppe),
        BiomeSymbol::Tundra => (vegetation > rules.tundra_taiga_min_vegetation
            && temperature > rules.tundra_taiga_min_temperature
            && freeze <= rules.tundra_taiga_max_freeze)
            .then_some(FeatureKey::Taiga),
        BiomeSymbol::Boreal => Some(FeatureKey::Taiga),
        BiomeSymbol::TemperateDry => {
            let forest = (moisture > rules.temperate_dry_forest_moisture
                || vegetation > rules.temperate_dry_forest_vegetation)
                && aridity <= rules.temperate_dry_forest_max_aridity;
            Some(if forest { FeatureKey::Forest } else { FeatureKey::SagebrushSteppe })
        }
        BiomeSymbol::TemperateHumid => Some(FeatureKey::Forest),
        BiomeSymbol::TropicalSeasonal => {
            let rainforest = moisture > rules.tropical_seasonal_rainforest_moisture
                && aridity <= rules.tropical_seasonal_rainforest_max_aridity;
            Some(if rainforest { FeatureKey::Rainforest } else { FeatureKey::SavannaWoodland })
        }
        BiomeSymbol::TropicalRainforest => Some(FeatureKey::Rainforest),
    }
}

// ── Resolver passes ───────────────────────────────────────────────────────────

struct Ctx<'a> {
    surface: &'a Surface,
    terrain: &'a TerrainMap,
    eco: &'a EcologyIndices,
    cfg: &'a FeaturesPlacementConfig,
}

impl Ctx<'_> {
    fn land_within(&self, i: usize, radius: u32) -> bool {
        self.surface.dims.within(i, radius).any(|j| j != i && self.terrain.is_land(j))
    }

    fn water_within(&self, i: usize, radius: u32) -> bool {
        self.surface.dims.within(i, radius).any(|j| j != i && self.terrain.is_water(j))
    }

    fn shallow_within(&self, i: usize, radius: u32) -> bool {
        self.surface.dims.within(i, radius).any(|j| j != i && self.terrain.is_shallow(j))
    }
}

fn place_ice<R: Rng>(ctx: &Ctx, board: &mut FeatureBoard, rng: &mut R) {
    let p = ctx.cfg.effective_chance(FeatureKey::Ice);
    if p <= 0.0 {
        return;
    }
    let rules = &ctx.cfg.ice;
    for i in 0..board.dims.len() {
        if !ctx.terrain.is_water(i) || !board.is_free(i) || ctx.surface.lat_of(i).abs() < rules.min_abs_latitude {
            continue;
        }
        if rules.forbid_adjacent_to_land && ctx.land_within(i, rules.land_adjacency_radius) {
            continue;
        }
        if rules.forbid_adjacent_to_natural_wonders && board.wonder_near(i, rules.natural_wonder_adjacency_radius) {
            continue;
        }
        if chance(rng, p) {
            board.place(i, FeatureKey::Ice);
        }
    }
}

fn place_reefs<R: Rng>(ctx: &Ctx, board: &mut FeatureBoard, rng: &mut R) {
    let warm = ctx.cfg.effective_chance(FeatureKey::Reef);
    let cold = ctx.cfg.effective_chance(FeatureKey::ColdReef);
    if warm <= 0.0 && cold <= 0.0 {
        return;
    }
    for i in 0..board.dims.len() {
        if !ctx.terrain.is_water(i) || !board.is_free(i) {
            continue;
        }
        let (key, p) = if ctx.surface.lat_of(i).abs() >= ctx.cfg.aquatic.reef_latitude_split {
            (FeatureKey::ColdReef, cold)
        } else {
            (FeatureKey::Reef, warm)
        };
        if p > 0.0 && chance(rng, p) {
            board.place(i, key);
        }
    }
}

fn place_atolls<R: Rng>(ctx: &Ctx, board: &mut FeatureBoard, rng: &mut R) {
    let base = ctx.cfg.effective_chance(FeatureKey::Atoll);
    if base <= 0.0 {
        return;
    }
    let rules = &ctx.cfg.aquatic.atoll;
    for i in 0..board.dims.len() {
        if !ctx.terrain.is_water(i) || !board.is_free(i) {
            continue;
        }
        let mut p = base;
        if rules.enable_clustering && board.has_near(i, FeatureKey::Atoll, rules.cluster_radius) {
            p = if ctx.surface.lat_of(i).abs() <= rules.equatorial_band_max_abs_latitude {
                rules.growth_chance_equatorial
            } else {
                rules.growth_chance_non_equatorial
            };
        }
        if p <= 0.0 {
            continue;
        }
        if rules.shallow_water_adjacency_gate_chance > 0.0
            && ctx.shallow_within(i, rules.shallow_water_adjacency_radius)
            && !chance(rng, rules.shallow_water_adjacency_gate_chance)
        {
            continue;
        }
        if chance(rng, p.clamp(0.0, 100.0)) {
            board.place(i, FeatureKey::Atoll);
        }
    }
}

fn place_lotus<R: Rng>(ctx: &Ctx, board: &mut FeatureBoard, rng: &mut R) {
    let p = ctx.cfg.effective_chance(FeatureKey::Lotus);
    if p <= 0.0 {
        return;
    }
    for i in 0..board.dims.len() {
        if ctx.terrain.is_water(i) && board.is_free(i) && chance(rng, p) {
            board.place(i, FeatureKey::Lotus);
        }
    }
}

fn place_wetlands<R: Rng>(ctx: &Ctx, board: &mut FeatureBoard, rng: &mut R) {
    let dims = board.dims;
    let wet = &ctx.cfg.wet;
    let river_near = dims.distance_field(&ctx.surface.river, wet.near_river_radius);
    let river_isolated = dims.distance_field(&ctx.surface.river, wet.isolated_river_radius);
    let coastal = |i: usize| ctx.water_within(i, wet.coastal_adjacency_radius);

    // marsh and bog near rivers
    let marsh = ctx.cfg.effective_chance(FeatureKey::Marsh);
    let bog = ctx.cfg.effective_chance(FeatureKey::TundraBog);
    if marsh > 0.0 || bog > 0.0 {
        for i in 0..dims.len() {
            if !ctx.terrain.is_land(i) || river_near[i] > wet.near_river_radius {
                continue;
            }
            let cold = wet.cold_biome_symbols.contains(&ctx.eco.symbol[i])
                || ctx.eco.temperature[i] <= wet.cold_temperature_max;
            let (key, p) = if cold { (FeatureKey::TundraBog, bog) } else { (FeatureKey::Marsh, marsh) };
            if p > 0.0 && board.is_free(i) && chance(rng, p) {
                board.place(i, key);
            }
        }
    }

    // mangroves on warm coasts
    let mangrove = ctx.cfg.effective_chance(FeatureKey::Mangrove);
    if mangrove > 0.0 {
        for i in 0..dims.len() {
            if !ctx.terrain.is_land(i) || !coastal(i) {
                continue;
            }
            let warm = wet.mangrove_warm_biome_symbols.contains(&ctx.eco.symbol[i])
                || ctx.eco.temperature[i] >= wet.mangrove_warm_temperature_min;
            if warm && board.is_free(i) && chance(rng, mangrove) {
                board.place(i, FeatureKey::Mangrove);
            }
        }
    }

    // oases and watering holes away from coasts and rivers
    let oasis = ctx.cfg.effective_chance(FeatureKey::Oasis);
    let watering = ctx.cfg.effective_chance(FeatureKey::WateringHole);
    if oasis > 0.0 || watering > 0.0 {
        for i in 0..dims.len() {
            if !ctx.terrain.is_land(i) || coastal(i) || river_isolated[i] <= wet.isolated_river_radius {
                continue;
            }
            let (key, p) = if wet.oasis_biome_symbols.contains(&ctx.eco.symbol[i]) {
                (FeatureKey::Oasis, oasis)
            } else {
                (FeatureKey::WateringHole, watering)
            };
            if p <= 0.0 || !board.is_free(i) || board.has_near(i, key, wet.isolated_spacing_radius) {
                continue;
            }
            if chance(rng, p) {
                board.place(i, key);
            }
        }
    }
}

fn place_vegetation<R: Rng>(ctx: &Ctx, board: &mut FeatureBoard, rng: &mut R) {
    if ctx.cfg.groups.vegetated.multiplier <= 0.0 {
        return;
    }
    let rules = &ctx.cfg.vegetated;
    let eco = ctx.eco;
    for i in 0..board.dims.len() {
        if !ctx.terrain.is_land(i) {
            continue;
        }
        let veg = eco.vegetation[i];
        let symbol = eco.symbol[i];
        if veg < rules.min_vegetation_by_biome.get(symbol) {
            continue;
        }
        let Some(key) =
            pick_vegetated(symbol, eco.moisture[i], eco.temperature[i], veg, eco.aridity[i], eco.freeze[i], rules)
        else {
            continue;
        };
        if !board.is_free(i) {
            continue;
        }
        let scalar = (veg * rules.vegetation_chance_scalar).clamp(0.0, 1.0);
        let p = (ctx.cfg.effective_chance(key) * scalar).round().clamp(0.0, 100.0);
        if chance(rng, p) {
            board.place(i, key);
        }
    }
}

/// Run every resolver pass in order onto a fresh board.
pub fn place_features(
    surface: &Surface,
    terrain: &TerrainMap,
    eco: &EcologyIndices,
    cfg: &FeaturesPlacementConfig,
    seed: u64,
) -> FeatureBoard {
    let ctx = Ctx { surface, terrain, eco, cfg };
    let mut board = FeatureBoard::new(surface);
    let mut rng = stage_rng(seed, SALT);
    place_ice(&ctx, &mut board, &mut rng);
    place_reefs(&ctx, &mut board, &mut rng);
    place_atolls(&ctx, &mut board, &mut rng);
    place_lotus(&ctx, &mut board, &mut rng);
    place_wetlands(&ctx, &mut board, &mut rng);
    place_vegetation(&ctx, &mut board, &mut rng);
    tracing::debug!(placed = board.count(), "feature resolver finished");
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve_features_placement_config;
    use crate::grid::Biome;
    use crate::ecology::classify;
    use serde_json::{json, Value};

    /// Ocean on the left half, land on the right.
    fn coast(w: usize, h: usize, lat: f64) -> (Surface, TerrainMap) {
        let dims = Dims::new(w, h);
        let surface = Surface {
            dims,
            latitude: vec![lat; h],
            elevation: vec![100.0; dims.len()],
            engine_rainfall: vec![100.0; dims.len()],
            river: vec![false; dims.len()],
            wonder: vec![false; dims.len()],
            biome: vec![Biome::Grassland; dims.len()],
            starts: Vec::new(),
        };
        let land: Vec<bool> = (0..dims.len()).map(|i| dims.xy(i).0 >= w / 2).collect();
        (surface, TerrainMap::from_land(dims, &land))
    }

    fn run(surface: &Surface, terrain: &TerrainMap, raw: Value) -> FeatureBoard {
        let cfg = resolve_features_placement_config(&raw).unwrap();
        let biome: Vec<Biome> =
            (0..surface.dims.len()).map(|i| if terrain.is_land(i) { Biome::Grassland } else { Biome::Marine }).collect();
        let rain = vec![120.0; surface.dims.len()];
        let eco = classify(surface, terrain, &rain, &biome);
        place_features(surface, terrain, &eco, &cfg, 11)
    }

    fn only(keys: &[&str]) -> Value {
        let chances: serde_json::Map<String, Value> = FeatureKey::ALL
            .iter()
            .map(|k| (k.as_str().to_string(), json!(if keys.contains(&k.as_str()) { 100 } else { 0 })))
            .collect();
        json!({ "chances": chances })
    }

    #[test]
    fn ice_keeps_off_the_coast() {
        let (surface, terrain) = coast(20, 6, 85.0);
        let board = run(&surface, &terrain, only(&["FEATURE_ICE"]));
        let dims = surface.dims;
        for i in 0..dims.len() {
            let (x, _) = dims.xy(i);
            if board.field[i] == Some(FeatureKey::Ice) {
                assert!(x < 9, "ice at column {x} touches land");
            }
        }
        assert!(board.field[dims.idx(0, 0)] == Some(FeatureKey::Ice));
    }

    #[test]
    fn no_ice_below_the_latitude_floor() {
        let (surface, terrain) = coast(20, 6, 60.0);
        let board = run(&surface, &terrain, only(&["FEATURE_ICE"]));
        assert_eq!(board.count(), 0);
    }

    #[test]
    fn reefs_switch_to_cold_past_the_split() {
        let (surface, terrain) = coast(10, 4, 60.0);
        let board = run(&surface, &terrain, only(&["FEATURE_REEF", "FEATURE_COLD_REEF"]));
        let h = board.histogram();
        assert_eq!(h.get("FEATURE_COLD_REEF"), Some(&20));
        assert_eq!(h.get("FEATURE_REEF"), None);
    }

    #[test]
    fn one_feature_per_plot_and_wonders_stay_bare() {
        let (mut surface, terrain) = coast(16, 8, 10.0);
        let w = surface.dims.idx(12, 4);
        surface.wonder[w] = true;
        let board = run(&surface, &terrain, json!({}));
        assert_eq!(board.field[w], None);
        let mut board2 = board.clone();
        let first = (0..board2.dims.len()).find(|&i| board2.field[i].is_some());
        if let Some(i) = first {
            assert!(!board2.place(i, FeatureKey::Lotus), "occupied plots refuse a second feature");
        }
    }

    #[test]
    fn oases_respect_spacing() {
        let dims = Dims::new(12, 12);
        let surface = Surface {
            dims,
            latitude: vec![25.0; 12],
            elevation: vec![100.0; dims.len()],
            engine_rainfall: vec![20.0; dims.len()],
            river: vec![false; dims.len()],
            wonder: vec![false; dims.len()],
            biome: vec![Biome::Desert; dims.len()],
            starts: Vec::new(),
        };
        let terrain = TerrainMap::from_land(dims, &vec![true; dims.len()]);
        let cfg = resolve_features_placement_config(&only(&["FEATURE_OASIS"])).unwrap();
        let rain = vec![20.0; dims.len()];
        let eco = classify(&surface, &terrain, &rain, &vec![Biome::Desert; dims.len()]);
        let board = place_features(&surface, &terrain, &eco, &cfg, 3);
        let oases: Vec<usize> = (0..dims.len()).filter(|&i| board.field[i] == Some(FeatureKey::Oasis)).collect();
        assert!(!oases.is_empty());
        for (k, &a) in oases.iter().enumerate() {
            for &b in &oases[k + 1..] {
                assert!(dims.chebyshev(a, b) > 1, "oases {a} and {b} are adjacent");
            }
        }
    }

    #[test]
    fn vegetated_choices_follow_the_symbol() {
        let rules = resolve_features_placement_config(&json!({})).unwrap().vegetated;
        assert_eq!(pick_vegetated(BiomeSymbol::Snow, 200.0, 0.0, 1.0, 0.0, 0.0, &rules), None);
        assert_eq!(pick_vegetated(BiomeSymbol::Boreal, 50.0, 0.0, 0.3, 0.0, 0.0, &rules), Some(FeatureKey::Taiga));
        assert_eq!(
            pick_vegetated(BiomeSymbol::TemperateDry, 60.0, 15.0, 0.3, 0.2, 0.0, &rules),
            Some(FeatureKey::SagebrushSteppe)
        );
        assert_eq!(
            pick_vegetated(BiomeSymbol::TemperateDry, 130.0, 15.0, 0.3, 0.2, 0.0, &rules),
            Some(FeatureKey::Forest)
        );
        assert_eq!(
            pick_vegetated(BiomeSymbol::TropicalSeasonal, 100.0, 26.0, 0.6, 0.0, 0.0, &rules),
            Some(FeatureKey::SavannaWoodland)
        );
        assert_eq!(pick_vegetated(BiomeSymbol::Tundra, 60.0, -4.0, 0.5, 0.0, 0.5, &rules), None);
    }
}
