//! Strongly typed view of the resolved config tree.
//!
//! Field names serialise in camelCase so a `ResolvedConfig` written back to
//! JSON is valid input for `config::resolve` and resolves to itself.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::features::FeaturesPlacementConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub toggles: Toggles,
    pub story: StoryConfig,
    pub microclimate: MicroclimateConfig,
    pub corridors: CorridorsConfig,
    pub landmass: LandmassConfig,
    pub coastlines: CoastlinesConfig,
    pub margins: MarginsConfig,
    pub islands: IslandsConfig,
    pub climate_baseline: ClimateBaselineConfig,
    pub climate_refine: ClimateRefineConfig,
    pub biomes: BiomesConfig,
    pub features_density: FeaturesDensityConfig,
    pub placement: PlacementConfig,
    pub features: FeaturesPlacementConfig,
    pub dev: DevConfig,
    pub world_model: WorldModelConfig,
}

// ── Toggles ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toggles {
    #[serde(rename = "STORY_ENABLE_HOTSPOTS")]
    pub hotspots: bool,
    #[serde(rename = "STORY_ENABLE_RIFTS")]
    pub rifts: bool,
    #[serde(rename = "STORY_ENABLE_OROGENY")]
    pub orogeny: bool,
    #[serde(rename = "STORY_ENABLE_SWATCHES")]
    pub swatches: bool,
    #[serde(rename = "STORY_ENABLE_PALEO")]
    pub paleo: bool,
    #[serde(rename = "STORY_ENABLE_CORRIDORS")]
    pub corridors: bool,
    #[serde(rename = "STORY_ENABLE_WORLDMODEL")]
    pub world_model: bool,
}

// ── Story ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryConfig {
    pub hotspot: HotspotConfig,
    pub rift: RiftConfig,
    pub orogeny: OrogenyConfig,
    pub swatches: SwatchesConfig,
    pub paleo: PaleoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotspotConfig {
    pub max_trails: u32,
    pub steps: u32,
    pub step_len: u32,
    pub min_dist_from_land: u32,
    pub min_trail_separation: u32,
    pub paradise_bias: f64,
    pub volcanic_bias: f64,
    pub volcanic_peak_chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiftConfig {
    pub max_rifts_per_map: u32,
    pub line_steps: u32,
    pub step_len: u32,
    pub shoulder_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrogenyConfig {
    pub belt_max_per_continent: u32,
    pub belt_min_length: u32,
    pub radius: u32,
    pub windward_boost: f64,
    pub lee_dryness_amplifier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwatchesConfig {
    pub max_per_map: u32,
    pub force_at_least_one: bool,
    pub size_scaling: SwatchSizeScaling,
    pub types: SwatchTypes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwatchSizeScaling {
    pub width_mul_sqrt: f64,
    pub length_mul_sqrt: f64,
}

/// Built-in swatch kinds plus user-defined latitude bands under `custom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwatchTypes {
    pub macro_desert_belt: MacroDesertBelt,
    pub equatorial_rainbelt: EquatorialRainbelt,
    pub rainforest_archipelago: RainforestArchipelago,
    pub mountain_forests: MountainForests,
    pub great_plains: GreatPlains,
    pub custom: BTreeMap<String, CustomSwatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroDesertBelt {
    pub weight: f64,
    pub latitude_center_deg: f64,
    pub half_width_deg: f64,
    pub dryness_delta: f64,
    pub bleed_radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquatorialRainbelt {
    pub weight: f64,
    pub latitude_center_deg: f64,
    pub half_width_deg: f64,
    pub wetness_delta: f64,
    pub bleed_radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainforestArchipelago {
    pub weight: f64,
    pub island_bias: f64,
    pub reef_bias: f64,
    pub wetness_delta: f64,
    pub bleed_radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountainForests {
    pub weight: f64,
    pub couple_to_orogeny: bool,
    pub windward_bonus: f64,
    pub lee_penalty: f64,
    pub bleed_radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreatPlains {
    pub weight: f64,
    pub latitude_center_deg: f64,
    pub half_width_deg: f64,
    pub dry_delta: f64,
    pub lowland_max_elevation: f64,
    pub bleed_radius: u32,
}

/// A user-defined latitude band: net delta is `wetnessDelta - drynessDelta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSwatch {
    pub weight: f64,
    pub latitude_center_deg: f64,
    pub half_width_deg: f64,
    pub wetness_delta: f64,
    pub dryness_delta: f64,
    pub bleed_radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaleoConfig {
    pub max_deltas: u32,
    pub delta_fan_radius: u32,
    pub delta_marsh_chance: f64,
    pub max_oxbows: u32,
    pub oxbow_elevation_max: f64,
    pub max_fossil_channels: u32,
    pub fossil_channel_length_tiles: u32,
    pub fossil_channel_step: u32,
    pub fossil_channel_humidity: f64,
    pub fossil_channel_min_distance_from_current_rivers: u32,
    pub min_distance_from_starts: u32,
    pub size_scaling: PaleoSizeScaling,
    pub elevation_carving: ElevationCarving,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaleoSizeScaling {
    pub length_mul_sqrt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationCarving {
    pub enable_canyon_rim: bool,
    pub rim_width: u32,
    pub canyon_dry_bonus: f64,
    pub bluff_wet_reduction: f64,
}

// ── Microclimate ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroclimateConfig {
    pub rainfall: MicroclimateRainfall,
    pub features: MicroclimateFeatures,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroclimateRainfall {
    pub rift_boost: f64,
    pub rift_radius: u32,
    pub paradise_delta: f64,
    pub volcanic_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicroclimateFeatures {
    pub paradise_reef_chance: f64,
    pub volcanic_forest_chance: f64,
    pub volcanic_taiga_chance: f64,
}

// ── Corridors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorsConfig {
    pub sea: SeaLaneConfig,
    pub island_hop: IslandHopConfig,
    pub land: LandCorridorConfig,
    pub river: RiverCorridorConfig,
    pub policy: CorridorPolicy,
    pub kinds: CorridorKinds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeaLaneConfig {
    pub max_lanes: u32,
    pub min_length_frac: f64,
    pub scan_stride: u32,
    pub avoid_radius: u32,
    pub prefer_diagonals: bool,
    pub lane_spacing: u32,
    pub min_channel_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandHopConfig {
    pub use_hotspots: bool,
    pub max_arcs: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandCorridorConfig {
    pub use_rift_shoulders: bool,
    pub max_corridors: u32,
    pub min_run_length: u32,
    pub spacing: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiverCorridorConfig {
    pub max_chains: u32,
    pub max_steps: u32,
    pub prefer_lowland_below: f64,
    pub coast_seed_radius: u32,
    pub min_tiles: u32,
    pub must_end_near_coast: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protection {
    Hard,
    Soft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorPolicy {
    pub sea: SeaPolicy,
    pub land: BiasPolicy,
    pub river: BiasPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeaPolicy {
    pub protection: Protection,
    pub soft_chance_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasPolicy {
    pub biomes_bias_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorKinds {
    pub sea: SeaStyles,
    pub island_hop: IslandHopStyles,
    pub land: LandStyles,
    pub river: RiverStyles,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeaStyles {
    pub styles: SeaStyleMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeaStyleMap {
    pub ocean: CorridorStyle,
    pub coastal: CorridorStyle,
    pub custom: BTreeMap<String, CorridorStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandHopStyles {
    pub styles: IslandHopStyleMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandHopStyleMap {
    pub archipelago: CorridorStyle,
    pub custom: BTreeMap<String, CorridorStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandStyles {
    pub styles: LandStyleMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandStyleMap {
    pub desert_belt: CorridorStyle,
    pub plains_belt: CorridorStyle,
    pub grassland_belt: CorridorStyle,
    pub canyon: CorridorStyle,
    pub plateau: CorridorStyle,
    pub flat_mtn: CorridorStyle,
    pub custom: BTreeMap<String, CorridorStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiverStyles {
    pub styles: RiverStyleMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiverStyleMap {
    pub river_chain: CorridorStyle,
    pub custom: BTreeMap<String, CorridorStyle>,
}

/// Soft biases a corridor style hands to later stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorStyle {
    pub biomes: StyleBiomes,
    pub features: StyleFeatures,
    pub edge: StyleEdge,
}

/// Relative biome lottery weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleBiomes {
    pub desert: f64,
    pub plains: f64,
    pub grassland: f64,
    pub tundra: f64,
    pub tropical: f64,
    pub snow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleFeatures {
    pub reef_bias: f64,
    pub floodplain_bias: f64,
    pub forest_bias: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleEdge {
    pub cliffs_chance: f64,
    pub fjord_chance: f64,
    pub bay_carve_multiplier: f64,
    pub shelf_reef_multiplier: f64,
    pub mountain_rim_chance: f64,
    pub forest_rim_chance: f64,
    pub hill_rim_chance: f64,
    pub escarpment_chance: f64,
}

// ── Landmass, coastlines, margins, islands ────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmassConfig {
    pub base_water_percent: f64,
    pub water_thumb_on_scale: f64,
    pub jitter_amp_frac_base: f64,
    pub jitter_amp_frac_scale: f64,
    pub curve_amp_frac: f64,
    pub geometry: LandmassGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmassGeometry {
    pub ocean_columns_scale: f64,
    pub ocean_water_columns: u32,
    pub polar_water_rows: u32,
    pub bands: Vec<LandmassBand>,
}

/// One continental window: fractions of map width plus ocean-column offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandmassBand {
    pub west_frac: f64,
    pub east_frac: f64,
    pub west_ocean_offset: f64,
    pub east_ocean_offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoastlinesConfig {
    pub bay: BayConfig,
    pub fjord: FjordConfig,
    pub min_sea_lane_width: u32,
    pub plate_bias: PlateBiasConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BayConfig {
    pub noise_gate_add: i32,
    pub roll_den_active: u32,
    pub roll_den_default: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FjordConfig {
    pub base_denom: u32,
    pub active_bonus: u32,
    pub passive_bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateBiasConfig {
    pub threshold: f64,
    pub power: f64,
    pub convergent: f64,
    pub transform: f64,
    pub divergent: f64,
    pub interior: f64,
    pub bay_weight: f64,
    pub bay_noise_bonus: f64,
    pub fjord_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginsConfig {
    pub active_fraction: f64,
    pub passive_fraction: f64,
    pub min_segment_length: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandsConfig {
    pub fractal_threshold_percent: f64,
    pub base_island_den_near_active: u32,
    pub base_island_den_else: u32,
    pub hotspot_seed_denom: u32,
    pub cluster_max: u32,
    pub min_dist_from_land_radius: u32,
}

// ── Climate ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateBaselineConfig {
    pub blend: BaselineBlend,
    pub bands: LatitudeBands,
    pub orographic: BaselineOrographic,
    pub coastal: BaselineCoastal,
    pub noise: BaselineNoise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineBlend {
    pub base_weight: f64,
    pub band_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatitudeBands {
    #[serde(rename = "deg0to10")]
    pub deg0to10: f64,
    #[serde(rename = "deg10to20")]
    pub deg10to20: f64,
    #[serde(rename = "deg20to35")]
    pub deg20to35: f64,
    #[serde(rename = "deg35to55")]
    pub deg35to55: f64,
    #[serde(rename = "deg55to70")]
    pub deg55to70: f64,
    #[serde(rename = "deg70plus")]
    pub deg70plus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineOrographic {
    pub hi1_threshold: f64,
    pub hi1_bonus: f64,
    pub hi2_threshold: f64,
    pub hi2_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineCoastal {
    pub coastal_land_bonus: f64,
    pub shallow_adj_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineNoise {
    pub base_span_small: u32,
    pub span_large_scale_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateRefineConfig {
    pub water_gradient: WaterGradient,
    pub orographic: RefineOrographic,
    pub river_corridor: RiverAdjacency,
    pub low_basin: LowBasin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterGradient {
    pub radius: u32,
    pub per_ring_bonus: f64,
    pub lowland_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineOrographic {
    pub steps: u32,
    pub reduction_base: f64,
    pub reduction_per_step: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiverAdjacency {
    pub lowland_adjacency_bonus: f64,
    pub highland_adjacency_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowBasin {
    pub radius: u32,
    pub delta: f64,
}

// ── Biomes, density, placement, dev ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomesConfig {
    pub tundra: TundraRule,
    pub tropical_coast: LatRainRule,
    pub river_valley_grassland: LatRainRule,
    pub rift_shoulder: RiftShoulderRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TundraRule {
    pub lat_min: f64,
    pub elev_min: f64,
    pub rain_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatRainRule {
    pub lat_max: f64,
    pub rain_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiftShoulderRule {
    pub grassland_lat_max: f64,
    pub grassland_rain_min: f64,
    pub tropical_lat_max: f64,
    pub tropical_rain_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesDensityConfig {
    pub rainforest_extra_chance: f64,
    pub forest_extra_chance: f64,
    pub taiga_extra_chance: f64,
    pub shelf_reef_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementConfig {
    pub wonders_plus_one: bool,
    pub floodplains: Floodplains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floodplains {
    pub min_length: u32,
    pub max_length: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevConfig {
    pub enabled: bool,
    pub log_timing: bool,
    pub log_story_tags: bool,
    pub rainfall_histogram: bool,
}

impl DevConfig {
    pub fn timing(&self) -> bool {
        self.enabled && self.log_timing
    }

    pub fn story_tags(&self) -> bool {
        self.enabled && self.log_story_tags
    }

    pub fn histogram(&self) -> bool {
        self.enabled && self.rainfall_histogram
    }
}

// ── World model ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldModelConfig {
    pub plates: PlatesConfig,
    pub wind: WindConfig,
    pub currents: CurrentsConfig,
    pub pressure: PressureConfig,
    pub directionality: DirectionalityConfig,
    pub policy: WorldPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatesConfig {
    pub count: u32,
    pub axis_angles: Vec<f64>,
    pub convergence_mix: f64,
    pub seed_jitter: u32,
    pub interior_smooth: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindConfig {
    pub jet_streaks: u32,
    pub jet_strength: f64,
    pub variance: f64,
    pub coriolis_zonal_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentsConfig {
    pub basin_gyre_count_max: u32,
    pub western_boundary_bias: f64,
    pub current_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureConfig {
    pub bumps: u32,
    pub amplitude: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionalityConfig {
    pub cohesion: f64,
    pub primary_axes: PrimaryAxes,
    pub interplay: Interplay,
    pub hemispheres: Hemispheres,
    pub variability: Variability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryAxes {
    pub plate_axis_deg: f64,
    pub wind_bias_deg: f64,
    pub current_bias_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interplay {
    pub winds_follow_plates: f64,
    pub currents_follow_winds: f64,
    pub rifts_follow_plates: f64,
    pub orogeny_opposes_rifts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hemispheres {
    pub southern_flip: bool,
    pub equator_band_deg: f64,
    pub monsoon_bias: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variability {
    pub angle_jitter_deg: f64,
    pub magnitude_variance: f64,
    pub seed_offset: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldPolicy {
    pub wind_influence: f64,
    pub current_humidity_bias: f64,
    pub boundary_fjord_bias: f64,
    pub shelf_reef_bias: f64,
    pub ocean_separation: OceanSeparation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OceanSeparation {
    pub enabled: bool,
    pub band_pairs: Vec<[u32; 2]>,
    pub base_separation_tiles: u32,
    pub boundary_closeness_multiplier: f64,
    pub max_per_row_delta: u32,
    pub respect_sea_lanes: bool,
    pub min_channel_width: u32,
}
