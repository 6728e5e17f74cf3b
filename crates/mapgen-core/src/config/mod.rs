//! Config resolution: partial JSON in, complete clamped `ResolvedConfig` out.

pub mod features;
pub mod schema;
mod tree;
pub mod types;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use features::{
    resolve_features_placement_config, BiomeSymbol, FeatureFamily, FeatureKey,
    FeaturesPlacementConfig, VegetatedRules,
};
pub use schema::ClampNote;
pub use types::*;

use crate::error::ConfigValidationError;

/// A resolved config together with every non-fatal adjustment made on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub config: ResolvedConfig,
    pub clamped: Vec<ClampNote>,
}

/// Merge `raw` over the built-in defaults.
///
/// `null` and absent groups count as empty objects. Fails only when a closed
/// section names an unknown key or a string enumeration gets an unknown value.
pub fn resolve(raw: &Value) -> Result<ResolvedConfig, ConfigValidationError> {
    resolve_with_report(raw).map(|r| r.config)
}

pub fn resolve_with_report(raw: &Value) -> Result<Resolution, ConfigValidationError> {
    let mut clamped = Vec::new();
    let tree = schema::apply(&tree::map_schema(), Some(raw), "", &mut clamped)?;
    let config: ResolvedConfig = shape(tree)?;

    if config.dev.enabled {
        for note in &clamped {
            tracing::debug!(path = %note.path, raw = %note.raw, resolved = %note.resolved, "config value adjusted");
        }
    }
    Ok(Resolution { config, clamped })
}

pub(crate) fn shape<T: DeserializeOwned>(tree: Value) -> Result<T, ConfigValidationError> {
    serde_json::from_value(tree).map_err(|e| ConfigValidationError::Shape(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn empty_object_resolves_to_documented_defaults() {
        let cfg = resolve(&json!({})).unwrap();
        assert!(cfg.toggles.hotspots && cfg.toggles.world_model);
        assert_eq!(cfg.story.hotspot.max_trails, 12);
        assert_eq!(cfg.corridors.sea.lane_spacing, 6);
        assert_eq!(cfg.corridors.policy.sea.protection, Protection::Hard);
        assert_eq!(cfg.world_model.plates.axis_angles, vec![15.0, -20.0, 35.0]);
        assert_eq!(cfg.landmass.geometry.bands.len(), 3);
        assert_eq!(cfg.world_model.policy.ocean_separation.band_pairs, vec![[0, 1], [1, 2]]);
        assert_relative_eq!(cfg.climate_baseline.bands.deg0to10, 120.0);
        assert_relative_eq!(cfg.corridors.kinds.land.styles.desert_belt.biomes.desert, 0.7);
        assert_relative_eq!(cfg.corridors.kinds.sea.styles.coastal.edge.bay_carve_multiplier, 1.15);
        assert!(cfg.story.swatches.types.custom.is_empty());
        assert!(!cfg.dev.enabled);
    }

    #[test]
    fn null_input_matches_empty_object() {
        assert_eq!(resolve(&Value::Null).unwrap(), resolve(&json!({})).unwrap());
    }

    #[test]
    fn bounded_fields_are_clamped_and_reported() {
        let report = resolve_with_report(&json!({
            "story": { "hotspot": { "volcanicPeakChance": 4.0, "maxTrails": -3 } },
            "margins": { "activeFraction": 1.7 },
            "biomes": { "tundra": { "latMin": 120 } },
            "featuresDensity": { "forestExtraChance": 400 }
        }))
        .unwrap();
        let cfg = &report.config;
        assert_relative_eq!(cfg.story.hotspot.volcanic_peak_chance, 1.0);
        assert_eq!(cfg.story.hotspot.max_trails, 0);
        assert_relative_eq!(cfg.margins.active_fraction, 1.0);
        assert_relative_eq!(cfg.biomes.tundra.lat_min, 90.0);
        assert_relative_eq!(cfg.features_density.forest_extra_chance, 100.0);
        assert_eq!(report.clamped.len(), 5, "every clamp should be noted: {:?}", report.clamped);
    }

    #[test]
    fn seed_offset_is_clamped_to_u32_and_noted() {
        let report = resolve_with_report(&json!({
            "worldModel": { "directionality": { "variability": { "seedOffset": 1e30 } } }
        }))
        .unwrap();
        let offset = report.config.world_model.directionality.variability.seed_offset;
        assert_eq!(offset, u32::MAX as i64);
        assert_eq!(report.clamped.len(), 1, "{:?}", report.clamped);
        assert!(report.clamped[0].path.ends_with("seedOffset"), "{:?}", report.clamped[0]);

        let low = resolve(&json!({ "worldModel": { "directionality": { "variability": { "seedOffset": -7 } } } }))
            .unwrap();
        assert_eq!(low.world_model.directionality.variability.seed_offset, 0);
    }

    #[test]
    fn resolving_resolved_output_is_a_fixed_point() {
        let first = resolve(&json!({
            "corridors": { "sea": { "maxLanes": 9.6 }, "policy": { "sea": { "protection": "soft" } } },
            "story": { "swatches": { "types": { "custom": { "fog": { "wetnessDelta": 12 } } } } },
            "landmass": { "geometry": { "bands": [{ "westFrac": 0.2, "eastFrac": 0.8 }] } },
            "features": { "chances": { "FEATURE_FOREST": 150 } }
        }))
        .unwrap();
        let again = resolve(&serde_json::to_value(&first).unwrap()).unwrap();
        assert_eq!(first, again);
        assert_eq!(first.corridors.sea.max_lanes, 10);
    }

    #[test]
    fn unknown_feature_chance_fails_before_anything_else() {
        let err = resolve(&json!({ "features": { "chances": { "FEATURE_JUNGLE": 10, "BOGUS": 1 } } }))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "features.chances contains unknown feature keys: BOGUS, FEATURE_JUNGLE"
        );
    }

    #[test]
    fn protection_outside_enumeration_is_rejected() {
        let err = resolve(&json!({ "corridors": { "policy": { "sea": { "protection": "medium" } } } }))
            .unwrap_err();
        assert!(matches!(err, ConfigValidationError::InvalidChoice { .. }), "got {err:?}");
    }

    #[test]
    fn corridor_style_typos_fail_but_custom_styles_pass() {
        let bad = resolve(&json!({ "corridors": { "kinds": { "land": { "styles": { "desrtBelt": {} } } } } }));
        assert!(bad.is_err(), "misspelt style must fail fast");

        let good = resolve(&json!({
            "corridors": { "kinds": { "land": { "styles": { "custom": {
                "saltFlat": { "biomes": { "desert": 0.9 } }
            } } } } }
        }))
        .unwrap();
        let salt = &good.corridors.kinds.land.styles.custom["saltFlat"];
        assert_relative_eq!(salt.biomes.desert, 0.9);
        assert_relative_eq!(salt.edge.bay_carve_multiplier, 1.0);
    }

    #[test]
    fn unknown_keys_in_open_groups_are_ignored() {
        let cfg = resolve(&json!({ "dev": { "LOG_MOUNTAINS": true }, "mountains": {} })).unwrap();
        assert!(!cfg.dev.enabled);
    }
}
