//! Mantle pressure: a few broad Gaussian bumps, normalised to 0..1.

use rand::Rng;

use crate::config::PressureConfig;
use crate::grid::Dims;
use crate::rng::stage_rng;

const SALT: u64 = 0x3B1D_77E2_05A9_C613;

pub fn generate(dims: Dims, cfg: &PressureConfig, seed: u64) -> Vec<f64> {
    let n = dims.len();
    if n == 0 || cfg.bumps == 0 || cfg.amplitude <= 0.0 {
        return vec![0.0; n];
    }

    let mut rng = stage_rng(seed, SALT);
    let scale = cfg.scale.max(0.1);
    let sigma = ((dims.width.min(dims.height) as f64 * scale).floor()).max(4.0);
    let reach = (sigma * 2.0) as i64;
    let inv = 1.0 / (2.0 * sigma * sigma);

    let mut acc = vec![0.0f64; n];
    for _ in 0..cfg.bumps {
        let cx = rng.gen_range(0..dims.width) as i64;
        let cy = rng.gen_range(0..dims.height) as i64;
        let a = cfg.amplitude * (0.75 + rng.gen_range(0..50) as f64 / 100.0);
        for y in (cy - reach).max(0)..=(cy + reach).min(dims.height as i64 - 1) {
            for x in (cx - reach).max(0)..=(cx + reach).min(dims.width as i64 - 1) {
                let (dx, dy) = ((x - cx) as f64, (y - cy) as f64);
                acc[dims.idx(x as usize, y as usize)] += a * (-(dx * dx + dy * dy) * inv).exp();
            }
        }
    }

    let max = acc.iter().cloned().fold(1e-6, f64::max);
    acc.iter().map(|v| (v / max).clamp(0.0, 1.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;

    #[test]
    fn pressure_is_normalised() {
        let cfg = resolve(&json!({})).unwrap();
        let p = generate(Dims::new(50, 30), &cfg.world_model.pressure, 3);
        let max = p.iter().cloned().fold(0.0, f64::max);
        assert!((max - 1.0).abs() < 1e-9, "peak should normalise to 1, got {max}");
        assert!(p.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn no_bumps_means_flat_field() {
        let cfg = resolve(&json!({ "worldModel": { "pressure": { "bumps": 0 } } })).unwrap();
        assert!(generate(Dims::new(10, 10), &cfg.world_model.pressure, 3).iter().all(|v| *v == 0.0));
    }
}
