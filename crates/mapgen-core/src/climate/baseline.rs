//! Baseline rainfall: the engine's own rainfall blended with a latitude band
//! target, plus relief, coastal and noise bonuses.

use rand::Rng;

use crate::config::{ClimateBaselineConfig, LatitudeBands};
use crate::grid::{per_plot, Surface};
use crate::landmass::TerrainMap;
use crate::rng::stage_rng;

use super::clamp_rain;

const SALT: u64 = 0xBA5E_1111_0000_0008;

/// Band target for `|lat|`, with the wet equatorial bands widened on large
/// maps by `equator_plus`.
pub fn band_rain(bands: &LatitudeBands, abs_lat: f64, equator_plus: f64) -> f64 {
    match abs_lat {
        l if l < 10.0 => bands.deg0to10 + equator_plus,
        l if l < 20.0 => bands.deg10to20 + (equator_plus * 0.6).floor(),
        l if l < 35.0 => bands.deg20to35,
        l if l < 55.0 => bands.deg35to55,
        l if l < 70.0 => bands.deg55to70,
        _ => bands.deg70plus,
    }
}

/// Half-width of the integer noise roll.
pub fn noise_span(cfg: &ClimateBaselineConfig, sqrt_scale: f64) -> i64 {
    let base = cfg.noise.base_span_small as i64;
    if sqrt_scale > 1.0 {
        base + cfg.noise.span_large_scale_factor.round() as i64
    } else {
        base
    }
}

/// Rainfall per plot, clamped to `0..=200`. Water keeps the engine value.
///
/// Rows draw noise from their own stream, so the result is the same whether
/// rows are computed in order or spread across threads.
pub fn baseline(surface: &Surface, terrain: &TerrainMap, cfg: &ClimateBaselineConfig, seed: u64) -> Vec<f64> {
    let rows = per_plot(surface.dims.height, |y| baseline_row(surface, terrain, cfg, seed, y));
    rows.into_iter().flatten().collect()
}

/// Baseline rainfall of row `y` alone.
fn baseline_row(surface: &Surface, terrain: &TerrainMap, cfg: &ClimateBaselineConfig, seed: u64, y: usize) -> Vec<f64> {
    let dims = surface.dims;
    let s = dims.sqrt_scale();
    let equator_plus = (12.0 * (s - 1.0)).round();
    let span = noise_span(cfg, s);
    let mut rng = stage_rng(seed, SALT ^ (y as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));

    (0..dims.width)
        .map(|x| {
            let i = dims.idx(x, y);
            let engine = surface.engine_rainfall[i];
            if terrain.is_water(i) {
                return clamp_rain(engine);
            }
            let elevation = surface.elevation[i];
            let band = band_rain(&cfg.bands, surface.lat_of(i).abs(), equator_plus);
            let mut rain = (engine * cfg.blend.base_weight + band * cfg.blend.band_weight).round();

            let oro = &cfg.orographic;
            if elevation > oro.hi1_threshold {
                rain += oro.hi1_bonus;
            }
            if elevation > oro.hi2_threshold {
                rain += oro.hi2_bonus;
            }
            if terrain.is_coastal_land(i) {
                rain += cfg.coastal.coastal_land_bonus;
            }
            if dims.neighbors(i).any(|j| terrain.is_shallow(j)) {
                rain += cfg.coastal.shallow_adj_bonus;
            }
            rain += rng.gen_range(-span..=span) as f64;
            clamp_rain(rain)
        })
        .collect()
}
