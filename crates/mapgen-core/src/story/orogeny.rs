//! Orogeny belts: contiguous high-relief ridges, with the land upwind of each
//! belt tagged windward and the land downwind tagged lee.

use std::collections::BTreeMap;

use super::Motif;
use crate::config::{DirectionalityConfig, OrogenyConfig};
use crate::grid::{Dims, Surface};
use crate::landmass::TerrainMap;
use crate::tags::{OrogenyTags, RiftTags};
use crate::world::{BoundaryKind, WorldModel};

const HIGH_ELEVATION: f64 = 500.0;

/// Candidate belt plots from plate uplift, relaxing the bar until enough
/// plots qualify.
fn plate_candidates(terrain: &TerrainMap, world: &WorldModel, min_len: usize) -> Vec<bool> {
    let dims = terrain.dims;
    let plates = &world.plates;
    let metric = |i: usize| 0.7 * plates.uplift[i] + 0.3 * plates.closeness[i];
    let mut thr = 180.0;
    let mut mask = vec![false; dims.len()];
    for _ in 0..5 {
        mask.iter_mut().for_each(|m| *m = false);
        for y in 1..dims.height.saturating_sub(1) {
            for x in 1..dims.width.saturating_sub(1) {
                let i = dims.idx(x, y);
                if !terrain.is_land(i)
                    || plates.boundary[i] != BoundaryKind::Convergent
                    || plates.closeness[i] < 48.0 / 255.0
                    || metric(i) * 255.0 < thr
                {
                    continue;
                }
                let dense = dims.neighbors(i).filter(|&j| metric(j) * 255.0 >= thr).count();
                mask[i] = dense >= 2;
            }
        }
        if mask.iter().filter(|m| **m).count() >= min_len || thr <= 128.0 {
            break;
        }
        thr -= 12.0;
    }
    mask
}

/// Candidate belt plots from raw elevation.
fn elevation_candidates(surface: &Surface, terrain: &TerrainMap) -> Vec<bool> {
    let dims = surface.dims;
    let high = |i: usize| terrain.is_land(i) && surface.elevation[i] >= HIGH_ELEVATION;
    (0..dims.len()).map(|i| high(i) && dims.neighbors(i).filter(|&j| high(j)).count() >= 2).collect()
}

/// 8-connected components of `mask`, each in ascending plot order.
fn components(dims: Dims, mask: &[bool]) -> Vec<Vec<usize>> {
    let mut seen = vec![false; dims.len()];
    let mut out = Vec::new();
    for start in 0..dims.len() {
        if !mask[start] || seen[start] {
            continue;
        }
        let mut stack = vec![start];
        let mut comp = Vec::new();
        seen[start] = true;
        while let Some(i) = stack.pop() {
            comp.push(i);
            for j in dims.neighbors(i) {
                if mask[j] && !seen[j] {
                    seen[j] = true;
                    stack.push(j);
                }
            }
        }
        comp.sort_unstable();
        out.push(comp);
    }
    out
}

#[allow(clippy::too_many_arguments)]
pub fn tag_orogeny(
    surface: &Surface,
    terrain: &TerrainMap,
    world: &WorldModel,
    rifts: &RiftTags,
    cfg: &OrogenyConfig,
    dir: &DirectionalityConfig,
    out: &mut OrogenyTags,
) -> Motif {
    let dims = surface.dims;
    let s = dims.sqrt_scale();
    let radius = cfg.radius as i64 + i64::from(s > 1.5);
    let min_len = ((cfg.belt_min_length as f64 * (0.9 + 0.4 * s)).round() as usize).max(10);
    let per_continent = cfg.belt_max_per_continent as usize;
    if per_continent == 0 || dims.is_empty() {
        return Motif::default();
    }

    let mut mask = if world.enabled {
        plate_candidates(terrain, world, min_len)
    } else {
        elevation_candidates(surface, terrain)
    };
    if dir.interplay.orogeny_opposes_rifts > 0.0 {
        for &i in &rifts.line {
            mask[i] = false;
        }
    }

    // belts grouped by the continent they sit on, longest first
    let continent_of = {
        let mut label = vec![usize::MAX; dims.len()];
        for (k, comp) in components(dims, &terrain.land_mask()).into_iter().enumerate() {
            for i in comp {
                label[i] = k;
            }
        }
        label
    };
    let mut by_continent: BTreeMap<usize, Vec<Vec<usize>>> = BTreeMap::new();
    for belt in components(dims, &mask).into_iter().filter(|b| b.len() >= min_len) {
        by_continent.entry(continent_of[belt[0]]).or_default().push(belt);
    }
    let mut requested = 0;
    for belts in by_continent.values_mut() {
        belts.sort_by(|a, b| b.len().cmp(&a.len()));
        belts.truncate(per_continent);
        requested += per_continent;
        for belt in belts.drain(..) {
            out.belt.extend(belt.iter().copied());
            out.belts.push(belt);
        }
    }

    for &i in &out.belt {
        let (dx, dy) = world.wind_step(i, surface.lat_of(i));
        for r in 1..=radius {
            if let Some(w) = dims.offset(i, -dx * r, -dy * r) {
                if terrain.is_land(w) && !out.belt.contains(&w) {
                    out.windward.insert(w);
                }
            }
            if let Some(l) = dims.offset(i, dx * r, dy * r) {
                if terrain.is_land(l) && !out.belt.contains(&l) {
                    out.lee.insert(l);
                }
            }
        }
    }

    let motif = Motif { placed: out.belts.len(), tiles: out.belt.len(), requested };
    tracing::debug!(
        belts = motif.placed,
        tiles = motif.tiles,
        windward = out.windward.len(),
        lee = out.lee.len(),
        plates = world.enabled,
        "orogeny belts tagged"
    );
    motif
}
