//! Coastline ruggedizing: bays flooded into coastal land and fjord inlets cut
//! from the water side, both steered by plate boundaries, margins and the
//! edge styles of nearby sea lanes.

use super::TerrainMap;
use crate::config::{CoastlinesConfig, CorridorKinds, PlateBiasConfig, StyleEdge, WorldPolicy};
use crate::corridors::{style_attrs_at, CorridorKind, CorridorSet, LaneGuard};
use crate::rng::{one_in, roll, stage_rng};
use crate::tags::MarginTags;
use crate::world::{BoundaryKind, WorldModel};

const SALT: u64 = 0xC0A5_7000_B4F1_0D11;

/// Everything the coastline pass reads besides the terrain it edits.
#[derive(Debug, Clone, Copy)]
pub struct CoastInputs<'a> {
    /// Hill fractal from the carve, `0..=255`.
    pub hill: &'a [u32],
    pub margins: &'a MarginTags,
    pub world: &'a WorldModel,
    pub corridors: &'a CorridorSet,
    pub kinds: &'a CorridorKinds,
    pub policy: &'a WorldPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoastReport {
    pub bays: usize,
    pub fjords: usize,
    /// Edits skipped because hard lane protection forbade them.
    pub protected: usize,
}

/// Signed boundary bias at plot `i`: positive near convergent margins,
/// negative near divergent ones.
pub fn plate_bias(world: &WorldModel, cfg: &PlateBiasConfig, i: usize) -> f64 {
    if !world.enabled {
        return 0.0;
    }
    let cn = world.plates.closeness[i];
    let thr = cfg.threshold;
    if thr < 1.0 && cn >= thr {
        let type_mul = match world.plates.boundary[i] {
            BoundaryKind::Convergent => cfg.convergent,
            BoundaryKind::Transform => cfg.transform,
            BoundaryKind::Divergent => cfg.divergent,
            BoundaryKind::None => 0.0,
        };
        ((cn - thr) / (1.0 - thr)).clamp(0.0, 1.0).powf(cfg.power) * type_mul
    } else if cfg.interior != 0.0 && thr > 0.0 {
        (1.0 - cn / thr).clamp(0.0, 1.0).powf(cfg.power) * cfg.interior
    } else {
        0.0
    }
}

fn scaled_den(den: u32, divisor: f64) -> u32 {
    if divisor <= 0.0 {
        return den.max(1);
    }
    ((den as f64 / divisor).round() as u32).max(1)
}

/// Edge style of the first sea lane on or next to `i`.
fn lane_edge<'a>(inputs: &CoastInputs<'a>, terrain: &TerrainMap, i: usize) -> Option<&'a StyleEdge> {
    std::iter::once(i)
        .chain(terrain.dims.neighbors(i))
        .find_map(|j| style_attrs_at(inputs.corridors, inputs.kinds, j, CorridorKind::Sea))
        .map(|s| &s.edge)
}

pub fn ruggedize(
    terrain: &mut TerrainMap,
    inputs: &CoastInputs<'_>,
    guard: &LaneGuard,
    cfg: &CoastlinesConfig,
    seed: u64,
) -> CoastReport {
    let dims = terrain.dims;
    let mut report = CoastReport::default();
    if dims.width < 3 || dims.height < 3 {
        return report;
    }
    let s = dims.sqrt_scale();
    let pb = &cfg.plate_bias;
    let fjord_weight = if inputs.world.enabled { pb.fjord_weight + inputs.policy.boundary_fjord_bias } else { 0.0 };
    let mut rng = stage_rng(seed, SALT);

    for y in 1..dims.height - 1 {
        for x in 1..dims.width - 1 {
            let i = dims.idx(x, y);
            let Some(soft) = guard.edit_scale(i) else {
                if terrain.is_coastal_land(i) || (terrain.is_water(i) && terrain.touches_land(i)) {
                    report.protected += 1;
                }
                continue;
            };
            let bias = plate_bias(inputs.world, pb, i);
            let near_boundary = inputs.world.enabled && inputs.world.plates.closeness[i] >= pb.threshold;

            if terrain.is_coastal_land(i) {
                // bays
                let active = inputs.margins.active.contains(&i) || near_boundary;
                let noise_gate = 2
                    + i64::from(s > 1.0)
                    + i64::from(cfg.bay.noise_gate_add)
                    + i64::from(active)
                    + (bias.max(0.0) * pb.bay_noise_bonus).round() as i64;
                let mut den = if active { cfg.bay.roll_den_active } else { cfg.bay.roll_den_default };
                if soft < 1.0 {
                    den = scaled_den(den, soft);
                }
                if pb.bay_weight > 0.0 && bias != 0.0 {
                    den = scaled_den(den, (1.0 + bias * pb.bay_weight).clamp(0.25, 4.0));
                }
                if let Some(edge) = lane_edge(inputs, terrain, i) {
                    if edge.bay_carve_multiplier != 1.0 {
                        den = scaled_den(den, edge.bay_carve_multiplier);
                    }
                }
                if i64::from(inputs.hill[i] % 97) < noise_gate && one_in(&mut rng, den) {
                    terrain.flood(i);
                    report.bays += 1;
                }
            } else if terrain.is_water(i) && terrain.touches_land(i) {
                // fjords
                let near_active = dims.neighbors(i).any(|j| inputs.margins.active.contains(&j));
                let near_passive = dims.neighbors(i).any(|j| inputs.margins.passive.contains(&j));
                let base = (cfg.fjord.base_denom as i64 - i64::from(s > 1.3)).max(6);
                let mut den = (base
                    - if near_passive { cfg.fjord.passive_bonus as i64 } else { 0 }
                    - if near_active { cfg.fjord.active_bonus as i64 } else { 0 })
                .max(4) as u32;
                if soft < 1.0 {
                    den = scaled_den(den, soft);
                }
                if fjord_weight > 0.0 && bias != 0.0 {
                    den = scaled_den(den, (1.0 + bias * fjord_weight).clamp(0.2, 5.0));
                }
                if let Some(edge) = lane_edge(inputs, terrain, i) {
                    let effect = (edge.fjord_chance + edge.cliffs_chance * 0.5).clamp(0.0, 0.5);
                    den = ((den as f64 * (1.0 - effect)).round() as u32).max(1);
                }
                if one_in(&mut rng, den) {
                    let inland: Vec<usize> = dims
                        .neighbors(i)
                        .filter(|&j| terrain.is_coastal_land(j) && guard.edit_scale(j).is_some())
                        .collect();
                    if !inland.is_empty() {
                        let j = inland[roll(&mut rng, inland.len() as u32) as usize];
                        terrain.flood(j);
                        report.fjords += 1;
                    }
                }
            }
        }
    }

    tracing::debug!(bays = report.bays, fjords = report.fjords, protected = report.protected, "coastlines ruggedized");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::corridors::{Corridor, CorridorTile, LaneAxis};
    use crate::grid::Dims;
    use crate::world::PlateModel;
    use serde_json::json;

    fn flat_world(dims: Dims) -> WorldModel {
        let cfg = resolve(&json!({})).unwrap();
        let lat = vec![0.0; dims.height];
        WorldModel::uniform(dims, &lat, &cfg.world_model)
    }

    fn half_land(dims: Dims) -> TerrainMap {
        let land: Vec<bool> = (0..dims.len()).map(|i| dims.xy(i).0 >= dims.width / 2).collect();
        TerrainMap::from_land(dims, &land)
    }

    #[test]
    fn bays_and_fjords_only_add_water() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(40, 40);
        let mut terrain = half_land(dims);
        let before = terrain.land_count();
        let world = flat_world(dims);
        let hill = vec![0u32; dims.len()];
        let set = CorridorSet::default();
        let inputs = CoastInputs {
            hill: &hill,
            margins: &MarginTags::default(),
            world: &world,
            corridors: &set,
            kinds: &cfg.corridors.kinds,
            policy: &cfg.world_model.policy,
        };
        let report = ruggedize(&mut terrain, &inputs, &LaneGuard::open(dims), &cfg.coastlines, 8);
        assert!(report.bays + report.fjords > 0, "a 38-plot coast should see some carving");
        assert_eq!(terrain.land_count(), before - report.bays - report.fjords);
    }

    #[test]
    fn hard_lanes_block_coastal_edits() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(20, 20);
        let mut terrain = half_land(dims);
        let world = flat_world(dims);
        let hill = vec![0u32; dims.len()];
        let mut set = CorridorSet::default();
        // lane down the last water column
        set.push(Corridor {
            kind: CorridorKind::Sea,
            axis: Some(LaneAxis::Col),
            index: 9,
            protection: Some(crate::config::Protection::Hard),
            biomes_bias_strength: 0.0,
            tiles: (0..20).map(|y| CorridorTile { plot: dims.idx(9, y), style: "coastal".into() }).collect(),
        });
        let guard = LaneGuard::new(dims, &set, &cfg.corridors.policy.sea, 4);
        let inputs = CoastInputs {
            hill: &hill,
            margins: &MarginTags::default(),
            world: &world,
            corridors: &set,
            kinds: &cfg.corridors.kinds,
            policy: &cfg.world_model.policy,
        };
        let before = terrain.clone();
        let report = ruggedize(&mut terrain, &inputs, &guard, &cfg.coastlines, 8);
        assert_eq!(report.bays + report.fjords, 0);
        assert!(report.protected > 0);
        assert_eq!(terrain, before);
    }

    #[test]
    fn boundary_bias_signs_follow_boundary_kind() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(4, 1);
        let mut world = flat_world(dims);
        world.enabled = true;
        world.plates = PlateModel::single(dims, 0.0);
        world.plates.closeness = vec![1.0; 4];
        world.plates.boundary =
            vec![BoundaryKind::Convergent, BoundaryKind::Divergent, BoundaryKind::Transform, BoundaryKind::None];
        let pb = &cfg.coastlines.plate_bias;
        assert!(plate_bias(&world, pb, 0) > 0.0);
        assert!(plate_bias(&world, pb, 1) < 0.0);
        assert!(plate_bias(&world, pb, 2) > 0.0);
        assert_eq!(plate_bias(&world, pb, 3), 0.0);
        world.enabled = false;
        assert_eq!(plate_bias(&world, pb, 0), 0.0);
    }
}
