//! World model: plates, mantle pressure, winds and ocean currents.
//!
//! Plates, pressure and winds only need the grid shape; currents need the
//! carved water mask and are generated once the landmass exists.

pub mod currents;
pub mod directionality;
pub mod plates;
pub mod pressure;
pub mod winds;

pub use currents::CurrentField;
pub use plates::{BoundaryKind, PlateModel};
pub use winds::WindField;

use crate::config::WorldModelConfig;
use crate::grid::Dims;

#[derive(Debug, Clone, PartialEq)]
pub struct WorldModel {
    pub plates: PlateModel,
    /// 0..1 per plot.
    pub pressure: Vec<f64>,
    pub wind: WindField,
    pub enabled: bool,
}

impl WorldModel {
    pub fn generate(dims: Dims, latitude: &[f64], cfg: &WorldModelConfig, seed: u64) -> Self {
        let plates = PlateModel::generate(dims, &cfg.plates, &cfg.directionality, seed);
        let pressure = pressure::generate(dims, &cfg.pressure, seed);
        let mut wind = WindField::generate(dims, latitude, &cfg.wind, &cfg.directionality, seed);
        wind.blend_toward(
            cfg.directionality.primary_axes.plate_axis_deg,
            cfg.directionality.interplay.winds_follow_plates,
        );
        tracing::debug!(
            plates = plates.plates.len(),
            convergent = plates.count_of(BoundaryKind::Convergent),
            divergent = plates.count_of(BoundaryKind::Divergent),
            transform = plates.count_of(BoundaryKind::Transform),
            "world model generated"
        );
        Self { plates, pressure, wind, enabled: true }
    }

    /// Physics switched off: one plate, flat pressure, zonal winds.
    pub fn uniform(dims: Dims, latitude: &[f64], cfg: &WorldModelConfig) -> Self {
        Self {
            plates: PlateModel::single(dims, cfg.directionality.primary_axes.plate_axis_deg),
            pressure: vec![0.0; dims.len()],
            wind: WindField::zonal(dims, latitude, cfg.wind.coriolis_zonal_scale),
            enabled: false,
        }
    }

    /// Unit grid step the wind blows toward at `i`: the dominant component of
    /// the wind field, or the zonal band for `lat` when the field is calm.
    pub fn wind_step(&self, i: usize, lat: f64) -> (i64, i64) {
        let (u, v) = self.wind.at(i);
        if u.abs() >= v.abs() && u != 0.0 {
            (u.signum() as i64, 0)
        } else if v != 0.0 {
            (0, v.signum() as i64)
        } else {
            (if !(30.0..60.0).contains(&lat.abs()) { -1 } else { 1 }, 0)
        }
    }

    /// Boundary-weighted relief signal used by orogeny and bay noise gates:
    /// `0.65 * uplift + 0.25 * closeness + 0.1 * pressure`.
    #[inline]
    pub fn relief(&self, i: usize) -> f64 {
        0.65 * self.plates.uplift[i] + 0.25 * self.plates.closeness[i] + 0.1 * self.pressure[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;

    #[test]
    fn same_seed_same_world() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(40, 24);
        let lat: Vec<f64> = (0..24).map(|y| 90.0 - (y as f64 + 0.5) * 7.5).collect();
        let a = WorldModel::generate(dims, &lat, &cfg.world_model, 77);
        let b = WorldModel::generate(dims, &lat, &cfg.world_model, 77);
        assert_eq!(a, b);
    }

    #[test]
    fn uniform_world_steps_with_the_zonal_bands() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(4, 3);
        let lat = [45.0, 10.0, -70.0];
        let world = WorldModel::uniform(dims, &lat, &cfg.world_model);
        assert_eq!(world.wind_step(dims.idx(1, 0), 45.0), (1, 0), "westerlies blow east");
        assert_eq!(world.wind_step(dims.idx(1, 1), 10.0), (-1, 0), "trades blow west");
        assert_eq!(world.wind_step(dims.idx(1, 2), -70.0), (-1, 0));
    }

    #[test]
    fn uniform_world_has_no_boundaries() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(12, 6);
        let lat: Vec<f64> = (0..6).map(|y| 75.0 - y as f64 * 30.0).collect();
        let w = WorldModel::uniform(dims, &lat, &cfg.world_model);
        assert_eq!(w.plates.count_of(BoundaryKind::None), dims.len());
        assert!(!w.enabled);
    }

    #[test]
    fn winds_follow_plates_aligns_the_field_with_the_plate_axis() {
        let lat: Vec<f64> = (0..30).map(|y| 87.0 - y as f64 * 6.0).collect();
        let dims = Dims::new(20, 30);
        let world = |follow: f64| {
            let cfg = resolve(&json!({ "worldModel": { "directionality": {
                "primaryAxes": { "plateAxisDeg": 90 },
                "interplay": { "windsFollowPlates": follow }
            } } }))
            .unwrap();
            WorldModel::generate(dims, &lat, &cfg.world_model, 12)
        };

        let free = world(0.0);
        assert!(free.wind.u.iter().any(|u| u.abs() > 10.0), "zonal winds have an east-west component");

        let locked = world(1.0);
        for i in 0..dims.len() {
            assert!(locked.wind.u[i].abs() < 1e-6, "plot {i}: u = {}", locked.wind.u[i]);
            assert!(locked.wind.v[i] >= 0.0, "plot {i}: v = {}", locked.wind.v[i]);
        }
    }
}

