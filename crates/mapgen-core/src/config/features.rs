//! Feature placement config: group multipliers, the closed chance table and
//! the per-family gating rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{
    abs_lat, apply, choice, closed, count, flag, group, list, num, percent, ratio, weight, ClampNote,
    Node,
};
use super::shape;
use crate::error::ConfigValidationError;

// ── Keys ──────────────────────────────────────────────────────────────────────

/// Every feature the placement resolver can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FeatureKey {
    #[serde(rename = "FEATURE_FOREST")]
    Forest,
    #[serde(rename = "FEATURE_RAINFOREST")]
    Rainforest,
    #[serde(rename = "FEATURE_TAIGA")]
    Taiga,
    #[serde(rename = "FEATURE_SAVANNA_WOODLAND")]
    SavannaWoodland,
    #[serde(rename = "FEATURE_SAGEBRUSH_STEPPE")]
    SagebrushSteppe,
    #[serde(rename = "FEATURE_MARSH")]
    Marsh,
    #[serde(rename = "FEATURE_TUNDRA_BOG")]
    TundraBog,
    #[serde(rename = "FEATURE_MANGROVE")]
    Mangrove,
    #[serde(rename = "FEATURE_OASIS")]
    Oasis,
    #[serde(rename = "FEATURE_WATERING_HOLE")]
    WateringHole,
    #[serde(rename = "FEATURE_REEF")]
    Reef,
    #[serde(rename = "FEATURE_COLD_REEF")]
    ColdReef,
    #[serde(rename = "FEATURE_ATOLL")]
    Atoll,
    #[serde(rename = "FEATURE_LOTUS")]
    Lotus,
    #[serde(rename = "FEATURE_ICE")]
    Ice,
}

/// Which group multiplier scales a feature's chance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureFamily {
    Vegetated,
    Wet,
    Aquatic,
    Ice,
}

impl FeatureKey {
    pub const ALL: [FeatureKey; 15] = [
        FeatureKey::Forest,
        FeatureKey::Rainforest,
        FeatureKey::Taiga,
        FeatureKey::SavannaWoodland,
        FeatureKey::SagebrushSteppe,
        FeatureKey::Marsh,
        FeatureKey::TundraBog,
        FeatureKey::Mangrove,
        FeatureKey::Oasis,
        FeatureKey::WateringHole,
        FeatureKey::Reef,
        FeatureKey::ColdReef,
        FeatureKey::Atoll,
        FeatureKey::Lotus,
        FeatureKey::Ice,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureKey::Forest => "FEATURE_FOREST",
            FeatureKey::Rainforest => "FEATURE_RAINFOREST",
            FeatureKey::Taiga => "FEATURE_TAIGA",
            FeatureKey::SavannaWoodland => "FEATURE_SAVANNA_WOODLAND",
            FeatureKey::SagebrushSteppe => "FEATURE_SAGEBRUSH_STEPPE",
            FeatureKey::Marsh => "FEATURE_MARSH",
            FeatureKey::TundraBog => "FEATURE_TUNDRA_BOG",
            FeatureKey::Mangrove => "FEATURE_MANGROVE",
            FeatureKey::Oasis => "FEATURE_OASIS",
            FeatureKey::WateringHole => "FEATURE_WATERING_HOLE",
            FeatureKey::Reef => "FEATURE_REEF",
            FeatureKey::ColdReef => "FEATURE_COLD_REEF",
            FeatureKey::Atoll => "FEATURE_ATOLL",
            FeatureKey::Lotus => "FEATURE_LOTUS",
            FeatureKey::Ice => "FEATURE_ICE",
        }
    }

    pub fn family(self) -> FeatureFamily {
        match self {
            FeatureKey::Forest
            | FeatureKey::Rainforest
            | FeatureKey::Taiga
            | FeatureKey::SavannaWoodland
            | FeatureKey::SagebrushSteppe => FeatureFamily::Vegetated,
            FeatureKey::Marsh
            | FeatureKey::TundraBog
            | FeatureKey::Mangrove
            | FeatureKey::Oasis
            | FeatureKey::WateringHole => FeatureFamily::Wet,
            FeatureKey::Reef | FeatureKey::ColdReef | FeatureKey::Atoll | FeatureKey::Lotus => {
                FeatureFamily::Aquatic
            }
            FeatureKey::Ice => FeatureFamily::Ice,
        }
    }

    fn default_chance(self) -> f64 {
        match self {
            FeatureKey::Forest | FeatureKey::Taiga | FeatureKey::Oasis => 50.0,
            FeatureKey::Rainforest => 65.0,
            FeatureKey::Atoll => 12.0,
            FeatureKey::Lotus => 15.0,
            FeatureKey::Ice => 90.0,
            _ => 30.0,
        }
    }
}

/// Ecology classifier output used by the placement rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BiomeSymbol {
    Snow,
    Tundra,
    Boreal,
    TemperateDry,
    TemperateHumid,
    TropicalSeasonal,
    TropicalRainforest,
    Desert,
}

const BIOME_SYMBOL_NAMES: &[&str] = &[
    "snow",
    "tundra",
    "boreal",
    "temperateDry",
    "temperateHumid",
    "tropicalSeasonal",
    "tropicalRainforest",
    "desert",
];

fn symbols(names: &[&str]) -> Vec<Value> {
    names.iter().map(|s| Value::from(*s)).collect()
}

// ── Typed config ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGroups {
    pub vegetated: FeatureGroup,
    pub wet: FeatureGroup,
    pub aquatic: FeatureGroup,
    pub ice: FeatureGroup,
}

impl FeatureGroups {
    pub fn multiplier(&self, family: FeatureFamily) -> f64 {
        match family {
            FeatureFamily::Vegetated => self.vegetated.multiplier,
            FeatureFamily::Wet => self.wet.multiplier,
            FeatureFamily::Aquatic => self.aquatic.multiplier,
            FeatureFamily::Ice => self.ice.multiplier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinVegetationByBiome {
    pub snow: f64,
    pub tundra: f64,
    pub boreal: f64,
    pub temperate_dry: f64,
    pub temperate_humid: f64,
    pub tropical_seasonal: f64,
    pub tropical_rainforest: f64,
    pub desert: f64,
}

impl MinVegetationByBiome {
    pub fn get(&self, symbol: BiomeSymbol) -> f64 {
        match symbol {
            BiomeSymbol::Snow => self.snow,
            BiomeSymbol::Tundra => self.tundra,
            BiomeSymbol::Boreal => self.boreal,
            BiomeSymbol::TemperateDry => self.temperate_dry,
            BiomeSymbol::TemperateHumid => self.temperate_humid,
            BiomeSymbol::TropicalSeasonal => self.tropical_seasonal,
            BiomeSymbol::TropicalRainforest => self.tropical_rainforest,
            BiomeSymbol::Desert => self.desert,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VegetatedRules {
    pub min_vegetation_by_biome: MinVegetationByBiome,
    pub vegetation_chance_scalar: f64,
    pub desert_sagebrush_min_vegetation: f64,
    pub desert_sagebrush_max_aridity: f64,
    pub tundra_taiga_min_vegetation: f64,
    pub tundra_taiga_min_temperature: f64,
    pub tundra_taiga_max_freeze: f64,
    pub temperate_dry_forest_moisture: f64,
    pub temperate_dry_forest_max_aridity: f64,
    pub temperate_dry_forest_vegetation: f64,
    pub tropical_seasonal_rainforest_moisture: f64,
    pub tropical_seasonal_rainforest_max_aridity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WetRules {
    pub near_river_radius: u32,
    pub cold_temperature_max: f64,
    pub cold_biome_symbols: Vec<BiomeSymbol>,
    pub mangrove_warm_temperature_min: f64,
    pub mangrove_warm_biome_symbols: Vec<BiomeSymbol>,
    pub coastal_adjacency_radius: u32,
    pub isolated_river_radius: u32,
    pub isolated_spacing_radius: u32,
    pub oasis_biome_symbols: Vec<BiomeSymbol>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtollRules {
    pub enable_clustering: bool,
    pub cluster_radius: u32,
    pub equatorial_band_max_abs_latitude: f64,
    pub shallow_water_adjacency_gate_chance: f64,
    pub shallow_water_adjacency_radius: u32,
    pub growth_chance_equatorial: f64,
    pub growth_chance_non_equatorial: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AquaticRules {
    pub reef_latitude_split: f64,
    pub atoll: AtollRules,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceRules {
    pub min_abs_latitude: f64,
    pub forbid_adjacent_to_land: bool,
    pub land_adjacency_radius: u32,
    pub forbid_adjacent_to_natural_wonders: bool,
    pub natural_wonder_adjacency_radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturesPlacementConfig {
    pub groups: FeatureGroups,
    pub chances: BTreeMap<FeatureKey, f64>,
    pub vegetated: VegetatedRules,
    pub wet: WetRules,
    pub aquatic: AquaticRules,
    pub ice: IceRules,
}

impl FeaturesPlacementConfig {
    pub fn chance(&self, key: FeatureKey) -> f64 {
        self.chances.get(&key).copied().unwrap_or(0.0)
    }

    /// Chance after the owning group's multiplier, still within 0..=100.
    pub fn effective_chance(&self, key: FeatureKey) -> f64 {
        (self.chance(key) * self.groups.multiplier(key.family())).clamp(0.0, 100.0)
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

pub(crate) fn schema() -> Node {
    let family = || group(vec![("multiplier", weight(1.0))]);
    let chances = closed(
        "feature",
        FeatureKey::ALL.iter().map(|k| (k.as_str(), percent(k.default_chance()))).collect(),
    );
    let symbol = || choice("snow", BIOME_SYMBOL_NAMES);

    group(vec![
        (
            "groups",
            group(vec![
                ("vegetated", family()),
                ("wet", family()),
                ("aquatic", family()),
                ("ice", family()),
            ]),
        ),
        ("chances", chances),
        (
            "vegetated",
            group(vec![
                (
                    "minVegetationByBiome",
                    group(vec![
                        ("snow", ratio(0.05)),
                        ("tundra", ratio(0.03)),
                        ("boreal", ratio(0.05)),
                        ("temperateDry", ratio(0.05)),
                        ("temperateHumid", ratio(0.05)),
                        ("tropicalSeasonal", ratio(0.05)),
                        ("tropicalRainforest", ratio(0.05)),
                        ("desert", ratio(0.02)),
                    ]),
                ),
                ("vegetationChanceScalar", weight(1.0)),
                ("desertSagebrushMinVegetation", ratio(0.2)),
                ("desertSagebrushMaxAridity", ratio(0.85)),
                ("tundraTaigaMinVegetation", ratio(0.25)),
                ("tundraTaigaMinTemperature", num(-2.0)),
                ("tundraTaigaMaxFreeze", ratio(0.9)),
                ("temperateDryForestMoisture", num(120.0)),
                ("temperateDryForestMaxAridity", ratio(0.65)),
                ("temperateDryForestVegetation", ratio(0.45)),
                ("tropicalSeasonalRainforestMoisture", num(140.0)),
                ("tropicalSeasonalRainforestMaxAridity", ratio(0.6)),
            ]),
        ),
        (
            "wet",
            group(vec![
                ("nearRiverRadius", count(2).min(1.0)),
                ("coldTemperatureMax", num(2.0)),
                ("coldBiomeSymbols", list(symbol(), symbols(&["snow", "tundra", "boreal"]))),
                ("mangroveWarmTemperatureMin", num(18.0)),
                (
                    "mangroveWarmBiomeSymbols",
                    list(symbol(), symbols(&["tropicalRainforest", "tropicalSeasonal"])),
                ),
                ("coastalAdjacencyRadius", count(1).min(1.0)),
                ("isolatedRiverRadius", count(1).min(1.0)),
                ("isolatedSpacingRadius", count(1).min(1.0)),
                ("oasisBiomeSymbols", list(symbol(), symbols(&["desert", "temperateDry"]))),
            ]),
        ),
        (
            "aquatic",
            group(vec![
                ("reefLatitudeSplit", abs_lat(55.0)),
                (
                    "atoll",
                    group(vec![
                        ("enableClustering", flag(true)),
                        ("clusterRadius", count(1).max(2.0)),
                        ("equatorialBandMaxAbsLatitude", abs_lat(23.0)),
                        ("shallowWaterAdjacencyGateChance", percent(30.0)),
                        ("shallowWaterAdjacencyRadius", count(1).min(1.0)),
                        ("growthChanceEquatorial", percent(15.0)),
                        ("growthChanceNonEquatorial", percent(5.0)),
                    ]),
                ),
            ]),
        ),
        (
            "ice",
            group(vec![
                ("minAbsLatitude", abs_lat(78.0)),
                ("forbidAdjacentToLand", flag(true)),
                ("landAdjacencyRadius", count(1).min(1.0)),
                ("forbidAdjacentToNaturalWonders", flag(true)),
                ("naturalWonderAdjacencyRadius", count(1).min(1.0)),
            ]),
        ),
    ])
}

/// Resolve a standalone feature placement block.
///
/// Unknown keys under `chances` are fatal; everything else clamps.
pub fn resolve_features_placement_config(
    raw: &Value,
) -> Result<FeaturesPlacementConfig, ConfigValidationError> {
    let mut notes = Vec::new();
    resolve_at(raw, "features", &mut notes)
}

pub(crate) fn resolve_at(
    raw: &Value,
    path: &str,
    notes: &mut Vec<ClampNote>,
) -> Result<FeaturesPlacementConfig, ConfigValidationError> {
    let tree = apply(&schema(), Some(raw), path, notes)?;
    shape(tree)
}
