//! Ocean currents: banded baseline flow plus basin gyres.
//!
//! Gyres turn clockwise in the northern hemisphere and counter-clockwise in
//! the southern one; western limbs are strengthened by `westernBoundaryBias`.

use std::collections::VecDeque;

use rand::Rng;

use super::directionality::{unit, Steering};
use super::winds::WindField;
use crate::config::{CurrentsConfig, DirectionalityConfig};
use crate::grid::Dims;
use crate::rng::stage_rng;

const SALT: u64 = 0x0CEA_4E11_72B3_9D05;
const LIMIT: f64 = 127.0;
/// Basins smaller than this get no gyre.
const MIN_GYRE_TILES: usize = 24;

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentField {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    /// Connected water basin id per plot; `None` on land.
    pub basin: Vec<Option<u32>>,
    pub gyres: usize,
}

impl CurrentField {
    pub fn still(dims: Dims) -> Self {
        Self { u: vec![0.0; dims.len()], v: vec![0.0; dims.len()], basin: vec![None; dims.len()], gyres: 0 }
    }

    #[inline]
    pub fn at(&self, i: usize) -> (f64, f64) {
        (self.u[i], self.v[i])
    }

    #[inline]
    pub fn speed(&self, i: usize) -> f64 {
        (self.u[i] * self.u[i] + self.v[i] * self.v[i]).sqrt()
    }

    pub fn generate(
        dims: Dims,
        latitude: &[f64],
        water: &[bool],
        wind: &WindField,
        cfg: &CurrentsConfig,
        dir: &DirectionalityConfig,
        seed: u64,
    ) -> Self {
        let mut rng = stage_rng(seed, SALT);
        let steering = Steering::new(dir);
        let follow = dir.interplay.currents_follow_winds * dir.cohesion;
        let span = dir.variability.angle_jitter_deg.round() as i64;
        let bias_mag = (25.0 * dir.cohesion).round();

        let (basin, basins) = label_basins(dims, water);
        let mut u = vec![0.0; dims.len()];
        let mut v = vec![0.0; dims.len()];

        for y in 0..dims.height {
            let lat = latitude[y];
            let base = banded(lat.abs());
            let (bu, bv) = unit(steering.current_bias_deg(lat) + rng.gen_range(-span..=span) as f64);
            for x in 0..dims.width {
                let i = dims.idx(x, y);
                if !water[i] {
                    continue;
                }
                let (wu, wv) = wind.at(i);
                u[i] = base + (wu * follow).round() + (bias_mag * bu).round();
                v[i] = (wv * follow).round() + (bias_mag * bv).round();
            }
        }

        let mut gyres = 0;
        for tiles in &basins {
            if tiles.len() < MIN_GYRE_TILES || cfg.basin_gyre_count_max == 0 {
                continue;
            }
            let mut halves: Vec<Vec<usize>> = vec![
                tiles.iter().copied().filter(|&i| latitude[i / dims.width] >= 0.0).collect(),
                tiles.iter().copied().filter(|&i| latitude[i / dims.width] < 0.0).collect(),
            ];
            halves.retain(|h| h.len() >= MIN_GYRE_TILES);
            halves.sort_by(|a, b| b.len().cmp(&a.len()));
            for half in halves.iter().take(cfg.basin_gyre_count_max as usize) {
                spin_gyre(dims, latitude, half, cfg, &mut u, &mut v);
                gyres += 1;
            }
        }

        for c in u.iter_mut().chain(v.iter_mut()) {
            *c = c.clamp(-LIMIT, LIMIT);
        }
        Self { u, v, basin, gyres }
    }
}

fn banded(abs_lat: f64) -> f64 {
    if abs_lat < 12.0 {
        -50.0
    } else if (45.0..60.0).contains(&abs_lat) {
        20.0
    } else if abs_lat >= 60.0 {
        -15.0
    } else {
        0.0
    }
}

fn spin_gyre(dims: Dims, latitude: &[f64], tiles: &[usize], cfg: &CurrentsConfig, u: &mut [f64], v: &mut [f64]) {
    let (sx, sy) = tiles.iter().fold((0.0, 0.0), |(sx, sy), &i| {
        let (x, y) = dims.xy(i);
        (sx + x as f64, sy + y as f64)
    });
    let cx = sx / tiles.len() as f64;
    let cy = sy / tiles.len() as f64;
    let reach = tiles
        .iter()
        .map(|&i| {
            let (x, y) = dims.xy(i);
            ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt()
        })
        .fold(1.0, f64::max);

    for &i in tiles {
        let (x, y) = dims.xy(i);
        let (dx, dy) = (x as f64 - cx, y as f64 - cy);
        let r = (dx * dx + dy * dy).sqrt();
        if r < 1e-9 {
            continue;
        }
        // clockwise on a north-up, y-down grid
        let (mut tu, mut tv) = (-dy / r, dx / r);
        if latitude[y] < 0.0 {
            tu = -tu;
            tv = -tv;
        }
        let ring = (r / reach).min(1.0);
        let mut mag = 10.0 * cfg.current_strength * (ring * (1.0 - ring) * 4.0).max(0.2);
        if dx < 0.0 {
            mag *= cfg.western_boundary_bias;
        }
        u[i] += (tu * mag).round();
        v[i] += (tv * mag).round();
    }
}

/// Connected 8-neighbour water components.
fn label_basins(dims: Dims, water: &[bool]) -> (Vec<Option<u32>>, Vec<Vec<usize>>) {
    let mut label = vec![None; dims.len()];
    let mut basins = Vec::new();
    for start in 0..dims.len() {
        if !water[start] || label[start].is_some() {
            continue;
        }
        let id = basins.len() as u32;
        let mut members = Vec::new();
        let mut queue = VecDeque::from([start]);
        label[start] = Some(id);
        while let Some(i) = queue.pop_front() {
            members.push(i);
            for j in dims.neighbors(i) {
                if water[j] && label[j].is_none() {
                    label[j] = Some(id);
                    queue.push_back(j);
                }
            }
        }
        basins.push(members);
    }
    (label, basins)
}
