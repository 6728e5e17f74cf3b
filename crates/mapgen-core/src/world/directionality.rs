//! Shared macro axes that keep plates, winds, currents and rifts loosely aligned.

use std::f64::consts::PI;

use crate::config::DirectionalityConfig;

/// Unit vector for a heading in degrees (0 = east, 90 = +y).
pub fn unit(deg: f64) -> (f64, f64) {
    let a = deg * PI / 180.0;
    (a.cos(), a.sin())
}

/// Absolute cosine between two headings: 1 parallel (either sense), 0 perpendicular.
pub fn alignment(a_deg: f64, b_deg: f64) -> f64 {
    ((a_deg - b_deg) * PI / 180.0).cos().abs()
}

/// Heading of a vector, degrees.
pub fn heading(u: f64, v: f64) -> f64 {
    v.atan2(u) * 180.0 / PI
}

#[derive(Debug, Clone, Copy)]
pub struct Steering<'a> {
    cfg: &'a DirectionalityConfig,
}

impl<'a> Steering<'a> {
    pub fn new(cfg: &'a DirectionalityConfig) -> Self {
        Self { cfg }
    }

    pub fn cohesion(&self) -> f64 {
        self.cfg.cohesion
    }

    /// Plate motion heading: the drawn base angle pulled toward the plate axis.
    pub fn plate_heading(&self, base_deg: f64, jitter_deg: f64) -> f64 {
        let c = self.cfg.cohesion;
        base_deg * (1.0 - c)
            + self.cfg.primary_axes.plate_axis_deg * c
            + jitter_deg * self.cfg.variability.magnitude_variance
    }

    /// Global wind bias heading for a row at latitude `lat`.
    pub fn wind_bias_deg(&self, lat: f64) -> f64 {
        let axes = &self.cfg.primary_axes;
        let deg = axes.wind_bias_deg
            + axes.plate_axis_deg * self.cfg.interplay.winds_follow_plates * self.cfg.cohesion;
        self.flip(deg, lat)
    }

    /// Global current bias heading for a row at latitude `lat`.
    pub fn current_bias_deg(&self, lat: f64) -> f64 {
        let axes = &self.cfg.primary_axes;
        let deg = axes.current_bias_deg
            + axes.plate_axis_deg * self.cfg.interplay.winds_follow_plates * self.cfg.cohesion * 0.5;
        self.flip(deg, lat)
    }

    /// Preferred rift heading: a free heading pulled toward the plate axis.
    pub fn rift_heading(&self, free_deg: f64) -> f64 {
        let w = self.cfg.interplay.rifts_follow_plates * self.cfg.cohesion;
        free_deg * (1.0 - w) + self.cfg.primary_axes.plate_axis_deg * w
    }

    fn flip(&self, deg: f64, lat: f64) -> f64 {
        if self.cfg.hemispheres.southern_flip && lat < 0.0 {
            -deg
        } else {
            deg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn full_cohesion_locks_plates_to_axis() {
        let cfg = resolve(&json!({ "worldModel": { "directionality": {
            "cohesion": 1.0,
            "primaryAxes": { "plateAxisDeg": 30 },
            "variability": { "magnitudeVariance": 0 }
        } } }))
        .unwrap();
        let s = Steering::new(&cfg.world_model.directionality);
        assert_relative_eq!(s.plate_heading(-120.0, 5.0), 30.0);
    }

    #[test]
    fn southern_flip_mirrors_bias() {
        let cfg = resolve(&json!({ "worldModel": { "directionality": {
            "primaryAxes": { "windBiasDeg": 40, "plateAxisDeg": 0 },
            "hemispheres": { "southernFlip": true }
        } } }))
        .unwrap();
        let s = Steering::new(&cfg.world_model.directionality);
        assert_relative_eq!(s.wind_bias_deg(30.0), 40.0);
        assert_relative_eq!(s.wind_bias_deg(-30.0), -40.0);
    }

    #[test]
    fn alignment_ignores_sense() {
        assert_relative_eq!(alignment(0.0, 180.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(alignment(0.0, 90.0), 0.0, epsilon = 1e-12);
    }
}
