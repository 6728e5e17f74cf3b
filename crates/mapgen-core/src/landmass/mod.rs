//! Landmass and coastline shaping.
//!
//! `carve` lays continental bands over a fractal, bowed by per-row jitter and
//! curvature so bands read as long arcs rather than straight columns.
//! `margins`, `coastlines` and `islands` then refine the mask.

pub mod coastlines;
pub mod islands;
pub mod margins;
pub mod terrain;

pub use terrain::{Terrain, TerrainMap};

use crate::config::{LandmassConfig, OceanSeparation};
use crate::fractal::{self, FractalSpec};
use crate::grid::Dims;
use crate::world::PlateModel;

const LANDMASS_SALT: u64 = 0x1A4D_0000_5EED_0001;
const HILL_SALT: u64 = 0x1A4D_0000_5EED_0002;

/// One continental window after ocean-column offsets, in plot columns/rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandWindow {
    pub west: i64,
    pub east: i64,
    pub south: i64,
    pub north: i64,
}

#[derive(Debug, Clone)]
pub struct Landmass {
    pub terrain: TerrainMap,
    pub bands: Vec<BandWindow>,
    pub water_percent: f64,
    pub water_height: u32,
    /// Hill fractal, reused by the coastline noise gate.
    pub hill: Vec<u32>,
}

/// Band windows from the configured fractions.
pub fn band_windows(dims: Dims, cfg: &LandmassConfig) -> Vec<BandWindow> {
    let g = &cfg.geometry;
    let w = dims.width as i64;
    let ocean_cols = (g.ocean_water_columns as f64 * g.ocean_columns_scale).floor();
    let polar = g.polar_water_rows as i64;
    g.bands
        .iter()
        .map(|b| {
            let west = (w as f64 * b.west_frac).floor() as i64 + (ocean_cols * b.west_ocean_offset).floor() as i64;
            let east = (w as f64 * b.east_frac).floor() as i64 + (ocean_cols * b.east_ocean_offset).floor() as i64;
            BandWindow {
                west: west.clamp(0, (w - 1).max(0)),
                east: east.clamp(0, (w - 1).max(0)),
                south: polar,
                north: dims.height as i64 - 1 - polar,
            }
        })
        .collect()
}

pub fn carve(
    dims: Dims,
    cfg: &LandmassConfig,
    separation: Option<(&OceanSeparation, &PlateModel)>,
    seed: u64,
) -> Landmass {
    let s = dims.sqrt_scale();
    let w = dims.width as i64;
    let h = dims.height;

    let heights = fractal::generate(dims, FractalSpec::LANDMASS, seed, LANDMASS_SALT);
    let hill = fractal::generate(dims, FractalSpec::HILL, seed, HILL_SALT);
    let water_percent = (cfg.base_water_percent + cfg.water_thumb_on_scale * (s - 1.0)).round().clamp(0.0, 100.0);
    let water_height = fractal::percentile(&heights, water_percent);

    let jitter_amp =
        ((dims.width as f64 * (cfg.jitter_amp_frac_base + cfg.jitter_amp_frac_scale * (s - 1.0))).floor() as i64).max(2);
    let curve_amp = (dims.width as f64 * cfg.curve_amp_frac * s).floor();
    let center_weight = 110.0 + (10.0 * (s - 1.0)).round();

    let bands = band_windows(dims, cfg);
    let row_shift = match separation {
        Some((sep, plates)) if sep.enabled => separation_shifts(dims, &bands, sep, plates),
        _ => vec![vec![0i64; h]; bands.len()],
    };

    let mut land = vec![false; dims.len()];
    for y in 0..h {
        let t = y as f64 / (h.max(2) - 1) as f64;
        for x in 0..dims.width {
            let i = dims.idx(x, y);
            let wobble = ((hill[i] % 200) as f64 / 200.0 - 0.5) * jitter_amp as f64;
            let wobble = wobble.floor();
            for (k, band) in bands.iter().enumerate() {
                if (y as i64) < band.south || (y as i64) > band.north {
                    continue;
                }
                let sin_offset = (((y + k * 13) as f64 * 0.25).sin() * jitter_amp as f64).floor() as i64;
                let curve = (curve_amp * (std::f64::consts::PI * t + k as f64 * 0.7).sin()).floor() as i64;
                let shift = sin_offset + (wobble * 0.5).floor() as i64 + curve + row_shift[k][y];
                let width_delta = (wobble * 0.3).floor() as i64;
                let west = (band.west + shift + width_delta).clamp(0, w - 1);
                let east = (band.east + shift - width_delta).clamp(0, w - 1);
                if (x as i64) < west || (x as i64) > east {
                    continue;
                }

                let cx = (band.west + band.east) as f64 / 2.0;
                let cy = (band.south + band.north) as f64 / 2.0;
                let dist = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
                let reach = (((band.east - band.west) as f64 / 2.0).powi(2)
                    + ((band.north - band.south) as f64 / 2.0).powi(2))
                .sqrt()
                .max(1.0);
                let bonus = ((1.0 - dist / reach) * center_weight).max(0.0);
                if heights[i] as f64 + bonus >= water_height as f64 {
                    land[i] = true;
                    break;
                }
            }
        }
    }

    let terrain = TerrainMap::from_land(dims, &land);
    tracing::debug!(
        water_percent,
        water_height,
        land = terrain.land_count(),
        bands = bands.len(),
        "landmass carved"
    );
    Landmass { terrain, bands, water_percent, water_height, hill }
}

/// Per-band, per-row column shifts that push paired bands apart where plate
/// boundaries run between them.
fn separation_shifts(dims: Dims, bands: &[BandWindow], sep: &OceanSeparation, plates: &PlateModel) -> Vec<Vec<i64>> {
    let mut shifts = vec![vec![0i64; dims.height]; bands.len()];
    let base = sep.base_separation_tiles as i64;
    let max_delta = sep.max_per_row_delta as i64;
    for pair in &sep.band_pairs {
        let (li, ri) = (pair[0] as usize, pair[1] as usize);
        if li >= bands.len() || ri >= bands.len() || li == ri {
            continue;
        }
        let (left, right) = (bands[li], bands[ri]);
        let mid_x = ((left.east + right.west) / 2).clamp(0, dims.width as i64 - 1) as usize;
        for y in 0..dims.height {
            let closeness = plates.closeness[dims.idx(mid_x, y)];
            let mut amount =
                (base + (closeness * sep.boundary_closeness_multiplier * base as f64).round() as i64).clamp(0, max_delta);
            if sep.respect_sea_lanes {
                let left_edge = left.east + shifts[li][y] - amount;
                let right_edge = right.west + shifts[ri][y] + amount;
                let deficit = sep.min_channel_width as i64 - (right_edge - left_edge);
                if deficit > 0 {
                    amount = (amount - deficit).max(0);
                }
            }
            shifts[li][y] -= amount;
            shifts[ri][y] += amount;
        }
    }
    shifts
}
