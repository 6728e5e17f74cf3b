//! Prevailing winds: zonal latitude bands, jet streaks, per-row variance and a
//! cohesive global bias.

use rand::Rng;

use super::directionality::{unit, Steering};
use crate::config::{DirectionalityConfig, WindConfig};
use crate::grid::Dims;
use crate::rng::stage_rng;

const SALT: u64 = 0x77D1_0C3B_9E02_4A58;
const LIMIT: f64 = 127.0;

/// Per-plot wind vector in tile units, each component in `-127..=127`.
/// `v` points toward increasing row index (southward).
#[derive(Debug, Clone, PartialEq)]
pub struct WindField {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

impl WindField {
    #[inline]
    pub fn at(&self, i: usize) -> (f64, f64) {
        (self.u[i], self.v[i])
    }

    /// Zonal bands only.
    pub fn zonal(dims: Dims, latitude: &[f64], coriolis: f64) -> Self {
        let mut u = vec![0.0; dims.len()];
        for y in 0..dims.height {
            let zonal = zonal_baseline(latitude[y].abs()) * coriolis;
            for x in 0..dims.width {
                u[dims.idx(x, y)] = zonal.clamp(-LIMIT, LIMIT);
            }
        }
        Self { u, v: vec![0.0; dims.len()] }
    }

    pub fn generate(
        dims: Dims,
        latitude: &[f64],
        cfg: &WindConfig,
        dir: &DirectionalityConfig,
        seed: u64,
    ) -> Self {
        let mut rng = stage_rng(seed, SALT);
        let steering = Steering::new(dir);
        let streaks = jet_latitudes(cfg.jet_streaks, &mut rng);
        let span = dir.variability.angle_jitter_deg.round() as i64;
        let band = dir.hemispheres.equator_band_deg;

        let n = dims.len();
        let mut u = vec![0.0; n];
        let mut v = vec![0.0; n];
        for y in 0..dims.height {
            let lat = latitude[y];
            let abs = lat.abs();
            let mut zu = zonal_baseline(abs) * cfg.coriolis_zonal_scale;
            let mut zv = 0.0;

            for (k, s) in streaks.iter().enumerate() {
                let f = (1.0 - (abs - s).abs() / 12.0).max(0.0);
                if f > 0.0 {
                    // alternate phase per streak so neighbouring jets meander
                    let phase = ((y as f64) * 0.35 + k as f64 * 1.7).sin();
                    let boost = (32.0 * cfg.jet_strength * f).round();
                    zu += if abs < *s { boost } else { -boost };
                    zv += (boost * 0.25 * phase).round();
                }
            }

            if abs < band && band > 0.0 {
                let toward_equator = if lat > 0.0 { 1.0 } else { -1.0 };
                zv += (dir.hemispheres.monsoon_bias * 20.0 * (1.0 - abs / band) * toward_equator).round();
            }

            let var_u = ((rng.gen_range(0..21) - 10) as f64 * cfg.variance).round();
            let var_v = ((rng.gen_range(0..11) - 5) as f64 * cfg.variance).round();
            let bias_deg = steering.wind_bias_deg(lat);

            for x in 0..dims.width {
                let i = dims.idx(x, y);
                let jitter = rng.gen_range(-span..=span) as f64;
                let (bu, bv) = unit(bias_deg + jitter);
                let mag = (30.0 * steering.cohesion()).round();
                u[i] = (zu + var_u + (mag * bu).round()).clamp(-LIMIT, LIMIT);
                v[i] = (zv + var_v + (mag * bv).round()).clamp(-LIMIT, LIMIT);
            }
        }
        Self { u, v }
    }

    /// Pull every vector toward a heading by `weight` (0..1), keeping magnitude.
    pub fn blend_toward(&mut self, heading_deg: f64, weight: f64) {
        if weight <= 0.0 {
            return;
        }
        let (hu, hv) = unit(heading_deg);
        for (u, v) in self.u.iter_mut().zip(self.v.iter_mut()) {
            let mag = (*u * *u + *v * *v).sqrt();
            *u = (*u * (1.0 - weight) + hu * mag * weight).clamp(-LIMIT, LIMIT);
            *v = (*v * (1.0 - weight) + hv * mag * weight).clamp(-LIMIT, LIMIT);
        }
    }
}

/// Trades and polar easterlies blow west (-), westerlies east (+).
fn zonal_baseline(abs_lat: f64) -> f64 {
    if !(30.0..60.0).contains(&abs_lat) {
        -80.0
    } else {
        80.0
    }
}

fn jet_latitudes<R: Rng>(count: u32, rng: &mut R) -> Vec<f64> {
    (0..count)
        .map(|s| {
            let base = 30.0 + s as f64 * (30.0 / (count.max(2) - 1) as f64);
            let jitter = rng.gen_range(0..12) as f64 - 6.0;
            (base + jitter).clamp(15.0, 75.0)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn lats(h: usize) -> Vec<f64> {
        (0..h).map(|y| 90.0 - (y as f64 + 0.5) * 180.0 / h as f64).collect()
    }

    #[test]
    fn trades_and_westerlies_have_opposite_sense() {
        let cfg = resolve(&json!({ "worldModel": {
            "wind": { "jetStreaks": 0, "variance": 0 },
            "directionality": { "cohesion": 0 }
        } }))
        .unwrap();
        let dims = Dims::new(8, 90);
        let lat = lats(90);
        let w = WindField::generate(dims, &lat, &cfg.world_model.wind, &cfg.world_model.directionality, 5);
        let trade_row = lat.iter().position(|l| l.abs() < 10.0).unwrap();
        let west_row = lat.iter().position(|l| (40.0..50.0).contains(l)).unwrap();
        assert!(w.u[dims.idx(0, trade_row)] < 0.0);
        assert!(w.u[dims.idx(0, west_row)] > 0.0);
    }

    #[test]
    fn components_stay_clamped() {
        let cfg = resolve(&json!({ "worldModel": { "wind": { "jetStrength": 40, "coriolisZonalScale": 9 } } }))
            .unwrap();
        let dims = Dims::new(16, 32);
        let w = WindField::generate(dims, &lats(32), &cfg.world_model.wind, &cfg.world_model.directionality, 5);
        assert!(w.u.iter().chain(&w.v).all(|c| c.abs() <= LIMIT));
    }

    #[test]
    fn blend_weight_turns_vectors_toward_the_heading() {
        let base = WindField { u: vec![-80.0, 0.0, 60.0], v: vec![0.0, 90.0, -60.0] };

        let mut untouched = base.clone();
        untouched.blend_toward(90.0, 0.0);
        assert_eq!(untouched, base, "zero weight leaves the field alone");

        let mut half = base.clone();
        half.blend_toward(90.0, 0.5);
        let mut full = base.clone();
        full.blend_toward(90.0, 1.0);
        for i in 0..3 {
            let mag = (base.u[i] * base.u[i] + base.v[i] * base.v[i]).sqrt();
            assert_relative_eq!(full.u[i], 0.0, epsilon = 1e-9);
            assert_relative_eq!(full.v[i], mag, epsilon = 1e-9);
            let toward = |u: f64, v: f64| v / (u * u + v * v).sqrt();
            assert!(
                toward(half.u[i], half.v[i]) >= toward(base.u[i], base.v[i]) - 1e-12,
                "plot {i}: half blend should not turn away from the heading"
            );
        }
    }
}

