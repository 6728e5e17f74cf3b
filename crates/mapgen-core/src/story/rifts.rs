//! Rift valleys: inland lines along divergent plate boundaries with a humid
//! shoulder band on either side.
//!
//! With the world model on, lines start at local maxima of rift potential and
//! follow the potential ridge. Without it they are random straight-ish walks
//! over lowland.

use super::Motif;
use crate::config::{DirectionalityConfig, RiftConfig};
use crate::grid::Surface;
use crate::landmass::TerrainMap;
use crate::rng::{roll, stage_rng};
use crate::tags::RiftTags;
use crate::world::directionality::unit;
use crate::world::{BoundaryKind, WorldModel};

const SALT: u64 = 0x21F7_0000_7A11_E501;
const MAX_LAT: f64 = 70.0;
const LEGACY_TRIES: usize = 300;
const LEGACY_MAX_ELEVATION: f64 = 500.0;

/// Potentials and closeness are stored in `0..1`; thresholds below are the
/// byte values they were tuned at.
fn byte(v: u8) -> f64 {
    v as f64 / 255.0
}

struct RiftWalk<'a> {
    surface: &'a Surface,
    terrain: &'a TerrainMap,
    shoulder_width: i64,
    out: &'a mut RiftTags,
}

impl RiftWalk<'_> {
    fn walkable(&self, i: usize) -> bool {
        self.terrain.is_land(i) && self.surface.lat_of(i).abs() <= MAX_LAT
    }

    /// Tag `i` as rift line and its perpendicular shoulders.
    fn tag(&mut self, i: usize, line: &mut Vec<usize>, (dx, dy): (i64, i64)) {
        if self.out.line.insert(i) {
            line.push(i);
        }
        self.out.shoulder.remove(&i);
        let dims = self.surface.dims;
        for off in 1..=self.shoulder_width {
            for (sx, sy) in [(-dy * off, dx * off), (dy * off, -dx * off)] {
                if let Some(j) = dims.offset(i, sx, sy) {
                    if self.terrain.is_land(j) && !self.out.line.contains(&j) {
                        self.out.shoulder.insert(j);
                    }
                }
            }
        }
    }
}

pub fn tag_rifts(
    surface: &Surface,
    terrain: &TerrainMap,
    world: &WorldModel,
    cfg: &RiftConfig,
    dir: &DirectionalityConfig,
    seed: u64,
    out: &mut RiftTags,
) -> Motif {
    let dims = surface.dims;
    let s = dims.sqrt_scale();
    let max_rifts = if cfg.max_rifts_per_map == 0 {
        0
    } else {
        ((cfg.max_rifts_per_map as f64 * (0.8 + 0.6 * s)).round() as usize).max(1)
    };
    let line_steps = ((cfg.line_steps as f64 * (0.9 + 0.4 * s)).round() as usize).max(1);
    let step_len = cfg.step_len.max(1) as i64;
    let shoulder_width = cfg.shoulder_width as i64 + i64::from(s > 1.5);
    if max_rifts == 0 || dims.width < 3 || dims.height < 3 {
        return Motif::default();
    }

    let mut walk = RiftWalk { surface, terrain, shoulder_width, out };
    let placed = if world.enabled {
        along_plates(&mut walk, world, max_rifts, line_steps, step_len, dir, s)
    } else {
        random_march(&mut walk, max_rifts, line_steps, step_len, seed)
    };

    let motif = Motif { placed, tiles: walk.out.line.len(), requested: max_rifts };
    tracing::debug!(
        rifts = placed,
        line = walk.out.line.len(),
        shoulder = walk.out.shoulder.len(),
        plates = world.enabled,
        "rift valleys tagged"
    );
    motif
}

fn along_plates(
    walk: &mut RiftWalk<'_>,
    world: &WorldModel,
    max_rifts: usize,
    line_steps: usize,
    step_len: i64,
    dir: &DirectionalityConfig,
    s: f64,
) -> usize {
    let dims = walk.surface.dims;
    let plates = &world.plates;
    let rp = &plates.rift;
    let divergent = |i: usize| plates.boundary[i] == BoundaryKind::Divergent;

    // sparse local maxima on divergent land, relaxing the bar until enough turn up
    let mut seeds: Vec<(usize, f64)> = Vec::new();
    let mut thr = 192u8;
    for _ in 0..6 {
        seeds.clear();
        for y in 1..dims.height - 1 {
            for x in 1..dims.width - 1 {
                let i = dims.idx(x, y);
                if !walk.walkable(i) || !divergent(i) || plates.closeness[i] <= byte(32) || rp[i] < byte(thr) {
                    continue;
                }
                if dims.neighbors(i).all(|j| rp[j] <= rp[i]) {
                    seeds.push((i, rp[i]));
                }
            }
        }
        if seeds.len() >= max_rifts * 2 || thr <= 112 {
            break;
        }
        thr -= 16;
    }
    seeds.sort_by(|a, b| b.1.total_cmp(&a.1));

    let min_seed_sep = if s > 1.5 { 18 } else { 14 };
    let mut chosen: Vec<usize> = Vec::new();
    for &(i, _) in &seeds {
        if chosen.len() >= max_rifts {
            break;
        }
        if chosen.iter().all(|&c| dims.manhattan(c, i) >= min_seed_sep) {
            chosen.push(i);
        }
    }

    let coh = dir.cohesion.clamp(0.0, 1.0);
    let follow = dir.interplay.rifts_follow_plates.clamp(0.0, 1.0) * coh;
    let axis = unit(dir.primary_axes.plate_axis_deg.trunc());
    let dir_bias = |tx: i64, ty: i64| -> f64 {
        if follow <= 0.0 {
            return 0.0;
        }
        let len = ((tx * tx + ty * ty) as f64).sqrt().max(1.0);
        (10.0 * follow * (axis.0 * tx as f64 + axis.1 * ty as f64) / len).round()
    };

    let mut made = 0;
    for &start in &chosen {
        // initial heading toward the strongest neighbour
        let mut heading = (1i64, 0i64);
        let mut best = -1.0;
        for (dx, dy) in ring() {
            if let Some(j) = dims.offset(start, dx, dy) {
                if walk.terrain.is_land(j) && rp[j] > best {
                    best = rp[j];
                    heading = (dx, dy);
                }
            }
        }

        let mut line = Vec::new();
        let mut at = start;
        for _ in 0..line_steps {
            if !walk.walkable(at) {
                break;
            }
            walk.tag(at, &mut line, heading);

            let mut best_score = f64::MIN;
            let mut next = None;
            for (tx, ty) in ring() {
                let Some(c) = dims.offset(at, tx * step_len, ty * step_len) else { continue };
                if !walk.terrain.is_land(c) {
                    continue;
                }
                let align = if (tx, ty) == heading {
                    16.0
                } else if (tx, ty) == (-heading.0, -heading.1) {
                    -12.0
                } else {
                    0.0
                };
                let score = rp[c] * 255.0 + align + dir_bias(tx, ty);
                if score > best_score {
                    best_score = score;
                    next = Some((c, (tx, ty)));
                }
            }
            let Some((c, h)) = next else { break };
            if !divergent(c) || plates.closeness[c] <= byte(16) || rp[c] < byte(64) {
                break;
            }
            at = c;
            heading = h;
        }
        if !line.is_empty() {
            walk.out.lines.push(line);
            made += 1;
        }
        if made >= max_rifts {
            break;
        }
    }
    made
}

fn random_march(walk: &mut RiftWalk<'_>, max_rifts: usize, line_steps: usize, step_len: i64, seed: u64) -> usize {
    const NS: [(i64, i64); 4] = [(0, 1), (0, -1), (1, 1), (-1, -1)];
    const EW: [(i64, i64); 4] = [(1, 0), (-1, 0), (1, 1), (-1, -1)];
    let dims = walk.surface.dims;
    let mut rng = stage_rng(seed, SALT);
    let mut made = 0;
    for _ in 0..LEGACY_TRIES {
        if made >= max_rifts {
            break;
        }
        let start = dims.idx(roll(&mut rng, dims.width as u32) as usize, roll(&mut rng, dims.height as u32) as usize);
        if !walk.walkable(start) || walk.surface.elevation[start] > LEGACY_MAX_ELEVATION {
            continue;
        }
        let dirs = if roll(&mut rng, 2) == 0 { NS } else { EW };
        let mut heading = dirs[roll(&mut rng, 4) as usize];
        let mut line = Vec::new();
        let mut at = start;
        for _ in 0..line_steps {
            let Some(next) = dims.offset(at, heading.0 * step_len, heading.1 * step_len) else { break };
            at = next;
            if walk.walkable(at) {
                walk.tag(at, &mut line, heading);
            }
            if roll(&mut rng, 6) == 0 {
                heading = dirs[roll(&mut rng, 4) as usize];
            }
        }
        if !line.is_empty() {
            walk.out.lines.push(line);
            made += 1;
        }
    }
    made
}

fn ring() -> impl Iterator<Item = (i64, i64)> {
    (-1..=1).flat_map(|dy| (-1..=1).map(move |dx| (dx, dy))).filter(|&d| d != (0, 0))
}
