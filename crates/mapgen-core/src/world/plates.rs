//! Voronoi plates with pairwise boundary classification.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::directionality::{unit, Steering};
use crate::config::{DirectionalityConfig, PlatesConfig};
use crate::grid::Dims;
use crate::rng::stage_rng;

const SALT: u64 = 0x9A7E_5C0F_1D44_B201;

/// Closeness above which a plot counts as boundary.
const BOUNDARY_CLOSENESS: f64 = 32.0 / 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    None,
    Convergent,
    Divergent,
    Transform,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plate {
    pub seed: usize,
    /// Unit motion vector.
    pub motion: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateModel {
    pub plates: Vec<Plate>,
    pub plate_id: Vec<u16>,
    pub boundary: Vec<BoundaryKind>,
    /// 0..1, highest on the midline between two plates.
    pub closeness: Vec<f64>,
    /// 0..1 mountain-building potential.
    pub uplift: Vec<f64>,
    /// 0..1 rifting potential.
    pub rift: Vec<f64>,
}

impl PlateModel {
    /// One plate covering the grid: no boundaries, no potentials.
    pub fn single(dims: Dims, heading_deg: f64) -> Self {
        let n = dims.len();
        let center = dims.idx(dims.width / 2, dims.height / 2);
        Self {
            plates: vec![Plate { seed: center, motion: unit(heading_deg) }],
            plate_id: vec![0; n],
            boundary: vec![BoundaryKind::None; n],
            closeness: vec![0.0; n],
            uplift: vec![0.0; n],
            rift: vec![0.0; n],
        }
    }

    pub fn generate(dims: Dims, cfg: &PlatesConfig, dir: &DirectionalityConfig, seed: u64) -> Self {
        let steering = Steering::new(dir);
        if dims.is_empty() {
            return Self::single(dims, dir.primary_axes.plate_axis_deg);
        }
        if cfg.count <= 1 {
            return Self::single(dims, steering.plate_heading(dir.primary_axes.plate_axis_deg, 0.0));
        }

        let mut rng = stage_rng(seed, SALT);
        let plates = scatter_seeds(dims, cfg, &steering, dir.variability.angle_jitter_deg, &mut rng);
        let kinds = classify_pairs(dims, &plates, cfg.convergence_mix);

        let n = dims.len();
        let mut plate_id = vec![0u16; n];
        let mut boundary = vec![BoundaryKind::None; n];
        let mut closeness = vec![0.0; n];
        let mut uplift = vec![0.0; n];
        let mut rift = vec![0.0; n];

        for i in 0..n {
            let (x, y) = dims.xy(i);
            let (mut best, mut best_p) = (f64::INFINITY, 0usize);
            let (mut second, mut second_p) = (f64::INFINITY, usize::MAX);
            for (p, plate) in plates.iter().enumerate() {
                let (sx, sy) = dims.xy(plate.seed);
                let dx = x as f64 - sx as f64;
                let dy = y as f64 - sy as f64;
                let d2 = dx * dx + dy * dy;
                if d2 < best {
                    second = best;
                    second_p = best_p;
                    best = d2;
                    best_p = p;
                } else if d2 < second {
                    second = d2;
                    second_p = p;
                }
            }

            plate_id[i] = best_p as u16;
            let gap = (second - best).max(1.0);
            let c = (1.0 - (gap / (gap + best + 1.0)).min(1.0)).powf(0.65);
            closeness[i] = c;

            let kind = if c > BOUNDARY_CLOSENESS && second_p != usize::MAX {
                kinds[best_p * plates.len() + second_p]
            } else {
                BoundaryKind::None
            };
            boundary[i] = kind;
            uplift[i] = if kind == BoundaryKind::Convergent { c } else { c * 0.25 };
            rift[i] = if kind == BoundaryKind::Divergent { c } else { c * 0.25 };
        }

        for _ in 0..cfg.interior_smooth {
            uplift = box_blur(dims, &uplift);
            rift = box_blur(dims, &rift);
        }

        Self { plates, plate_id, boundary, closeness, uplift, rift }
    }

    pub fn count_of(&self, kind: BoundaryKind) -> usize {
        self.boundary.iter().filter(|b| **b == kind).count()
    }
}

fn scatter_seeds<R: Rng>(
    dims: Dims,
    cfg: &PlatesConfig,
    steering: &Steering<'_>,
    angle_jitter: f64,
    rng: &mut R,
) -> Vec<Plate> {
    let count = cfg.count as usize;
    let rows = ((count as f64).sqrt().floor() as usize).max(1);
    let cols = count.div_ceil(rows).max(1);
    let cell_w = (dims.width / cols).max(1);
    let cell_h = (dims.height / rows).max(1);
    let jitter = cfg.seed_jitter as i64;
    let span = angle_jitter.round() as i64;

    let mut plates = Vec::with_capacity(count);
    'rows: for ry in 0..rows {
        for cx in 0..cols {
            if plates.len() == count {
                break 'rows;
            }
            let bx = (cx * cell_w + cell_w / 2).min(dims.width - 1) as i64;
            let by = (ry * cell_h + cell_h / 2).min(dims.height - 1) as i64;
            let jx = rng.gen_range(-jitter..=jitter);
            let jy = rng.gen_range(-jitter..=jitter);
            let sx = (bx + jx).clamp(0, dims.width as i64 - 1) as usize;
            let sy = (by + jy).clamp(0, dims.height as i64 - 1) as usize;

            let base = if cfg.axis_angles.is_empty() {
                0.0
            } else {
                cfg.axis_angles[rng.gen_range(0..cfg.axis_angles.len())]
            };
            let wobble = rng.gen_range(-span..=span) as f64;
            let heading = steering.plate_heading(base, wobble);
            plates.push(Plate { seed: dims.idx(sx, sy), motion: unit(heading) });
        }
    }
    plates
}

/// Boundary kind for every ordered plate pair, from relative motion across
/// the line joining their seeds.
fn classify_pairs(dims: Dims, plates: &[Plate], convergence_mix: f64) -> Vec<BoundaryKind> {
    let n = plates.len();
    let mut kinds = vec![BoundaryKind::None; n * n];
    let bias = convergence_mix - 0.5;
    for a in 0..n {
        for b in 0..n {
            if a == b {
                continue;
            }
            let (ax, ay) = dims.xy(plates[a].seed);
            let (bx, by) = dims.xy(plates[b].seed);
            let (nx, ny) = (bx as f64 - ax as f64, by as f64 - ay as f64);
            let len = (nx * nx + ny * ny).sqrt().max(1e-9);
            let (nx, ny) = (nx / len, ny / len);
            let rx = plates[b].motion.0 - plates[a].motion.0;
            let ry = plates[b].motion.1 - plates[a].motion.1;
            let closing = -(rx * nx + ry * ny) + bias;
            let shear = (rx * ny - ry * nx).abs();
            kinds[a * n + b] = if shear > closing.abs() * 1.5 {
                BoundaryKind::Transform
            } else if closing >= 0.0 {
                BoundaryKind::Convergent
            } else {
                BoundaryKind::Divergent
            };
        }
    }
    kinds
}

fn box_blur(dims: Dims, field: &[f64]) -> Vec<f64> {
    (0..dims.len())
        .map(|i| {
            let (sum, n) = dims.within(i, 1).fold((0.0, 0usize), |(s, n), j| (s + field[j], n + 1));
            sum / n as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;

    #[test]
    fn zero_plates_degrades_to_one_uniform_plate() {
        let cfg = resolve(&json!({ "worldModel": { "plates": { "count": 0 } } })).unwrap();
        let dims = Dims::new(30, 20);
        let m = PlateModel::generate(dims, &cfg.world_model.plates, &cfg.world_model.directionality, 1);
        assert_eq!(m.plates.len(), 1);
        assert!(m.plate_id.iter().all(|p| *p == 0));
        assert_eq!(m.count_of(BoundaryKind::None), dims.len());
    }

    #[test]
    fn plates_have_boundaries_and_bounded_potentials() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(64, 40);
        let m = PlateModel::generate(dims, &cfg.world_model.plates, &cfg.world_model.directionality, 42);
        assert_eq!(m.plates.len(), 8);
        assert!(m.count_of(BoundaryKind::None) < dims.len(), "some plots must sit on a boundary");
        assert!(m.uplift.iter().chain(&m.rift).all(|v| (0.0..=1.0).contains(v)));
        assert!(m.plate_id.iter().all(|p| (*p as usize) < m.plates.len()));
    }

    #[test]
    fn head_on_plates_converge() {
        let dims = Dims::new(20, 10);
        let plates = vec![
            Plate { seed: dims.idx(2, 5), motion: (1.0, 0.0) },
            Plate { seed: dims.idx(17, 5), motion: (-1.0, 0.0) },
        ];
        let kinds = classify_pairs(dims, &plates, 0.5);
        assert_eq!(kinds[1], BoundaryKind::Convergent);
        assert_eq!(kinds[2], BoundaryKind::Convergent);
    }
}
