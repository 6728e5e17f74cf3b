//! Story-driven rainfall: rift valleys, orogeny flanks and hotspot islands.

use crate::config::{MicroclimateConfig, OrogenyConfig};
use crate::grid::Surface;
use crate::landmass::TerrainMap;
use crate::tags::{PlotSet, StoryTags};
use crate::world::CurrentField;

use super::clamp_rain;

const HOTSPOT_RADIUS: u32 = 2;
const LEE_BASE: f64 = 8.0;
/// Rainfall a full-speed current adds at a bias of 1.
const CURRENT_SCALE: f64 = 10.0;
const CURRENT_LIMIT: f64 = 127.0;

fn near(surface: &Surface, set: &PlotSet, i: usize, radius: u32) -> bool {
    !set.is_empty() && surface.dims.within(i, radius).any(|j| j != i && set.contains(&j))
}

/// Land near a rift line gains humidity, less the higher it sits.
pub fn rift_humidity(rain: &mut [f64], surface: &Surface, terrain: &TerrainMap, tags: &StoryTags, cfg: &MicroclimateConfig) -> usize {
    let rc = &cfg.rainfall;
    if tags.rifts.line.is_empty() || rc.rift_radius == 0 || rc.rift_boost == 0.0 {
        return 0;
    }
    let mut touched = 0;
    for i in 0..surface.dims.len() {
        if terrain.is_water(i) || !near(surface, &tags.rifts.line, i, rc.rift_radius) {
            continue;
        }
        let penalty = ((surface.elevation[i] - 200.0) / 150.0).floor().max(0.0);
        rain[i] = clamp_rain(rain[i] + (rc.rift_boost - penalty).max(0.0));
        touched += 1;
    }
    touched
}

/// Windward flanks of orogeny belts get wetter, lee flanks drier.
pub fn orogeny_flanks(rain: &mut [f64], terrain: &TerrainMap, tags: &StoryTags, cfg: &OrogenyConfig) -> usize {
    let extra = (LEE_BASE * (cfg.lee_dryness_amplifier - 1.0)).round().max(0.0);
    let mut touched = 0;
    for &i in tags.orogeny.windward.iter().filter(|&&i| terrain.is_land(i)) {
        rain[i] = clamp_rain(rain[i] + cfg.windward_boost);
        touched += 1;
    }
    for &i in tags.orogeny.lee.iter().filter(|&&i| terrain.is_land(i)) {
        rain[i] = clamp_rain(rain[i] - (LEE_BASE + extra));
        touched += 1;
    }
    touched
}

/// Land around paradise and volcanic hotspot centres picks up their deltas.
pub fn hotspot_islands(rain: &mut [f64], surface: &Surface, terrain: &TerrainMap, tags: &StoryTags, cfg: &MicroclimateConfig) -> usize {
    let hs = &tags.hotspots;
    if hs.paradise.is_empty() && hs.volcanic.is_empty() {
        return 0;
    }
    let mut touched = 0;
    for i in 0..surface.dims.len() {
        if terrain.is_water(i) {
            continue;
        }
        let mut delta = 0.0;
        if near(surface, &hs.paradise, i, HOTSPOT_RADIUS) {
            delta += cfg.rainfall.paradise_delta;
        }
        if near(surface, &hs.volcanic, i, HOTSPOT_RADIUS) {
            delta += cfg.rainfall.volcanic_delta;
        }
        if delta != 0.0 {
            rain[i] = clamp_rain(rain[i] + delta);
            touched += 1;
        }
    }
    touched
}

/// Coastal land beside a strong current picks up moisture, scaled by the
/// fastest adjacent current and `bias`.
pub fn current_humidity(rain: &mut [f64], terrain: &TerrainMap, currents: &CurrentField, bias: f64) -> usize {
    if bias <= 0.0 {
        return 0;
    }
    let dims = terrain.dims;
    let mut touched = 0;
    for i in 0..dims.len() {
        if !terrain.is_coastal_land(i) {
            continue;
        }
        let speed = dims.neighbors(i).filter(|&j| terrain.is_water(j)).map(|j| currents.speed(j)).fold(0.0, f64::max);
        let delta = (bias * CURRENT_SCALE * (speed / CURRENT_LIMIT).min(1.0)).round();
        if delta > 0.0 {
            rain[i] = clamp_rain(rain[i] + delta);
            touched += 1;
        }
    }
    touched
}

pub fn apply(
    rain: &mut [f64],
    surface: &Surface,
    terrain: &TerrainMap,
    tags: &StoryTags,
    cfg: &MicroclimateConfig,
    orogeny: &OrogenyConfig,
) -> usize {
    let rift = rift_humidity(rain, surface, terrain, tags, cfg);
    let flanks = orogeny_flanks(rain, terrain, tags, orogeny);
    let hotspots = hotspot_islands(rain, surface, terrain, tags, cfg);
    tracing::debug!(rift, flanks, hotspots, "microclimates applied");
    rift + flanks + hotspots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use crate::grid::{Biome, Dims};
    use serde_json::json;

    fn flat(dims: Dims, elevation: f64) -> Surface {
        Surface {
            dims,
            latitude: vec![20.0; dims.height],
            elevation: vec![elevation; dims.len()],
            engine_rainfall: vec![100.0; dims.len()],
            river: vec![false; dims.len()],
            wonder: vec![false; dims.len()],
            biome: vec![Biome::Plains; dims.len()],
            starts: Vec::new(),
        }
    }

    #[test]
    fn rift_boost_shrinks_with_elevation() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(10, 10);
        let terrain = TerrainMap::from_land(dims, &vec![true; dims.len()]);
        let mut tags = StoryTags::default();
        tags.rifts.line.insert(dims.idx(5, 5));

        let mut low = vec![100.0; dims.len()];
        rift_humidity(&mut low, &flat(dims, 100.0), &terrain, &tags, &cfg.microclimate);
        assert_eq!(low[dims.idx(6, 6)], 108.0);
        assert_eq!(low[dims.idx(5, 5)], 100.0, "the line itself is not near itself");
        assert_eq!(low[dims.idx(9, 9)], 100.0);

        let mut high = vec![100.0; dims.len()];
        rift_humidity(&mut high, &flat(dims, 650.0), &terrain, &tags, &cfg.microclimate);
        assert_eq!(high[dims.idx(6, 6)], 105.0);
    }

    #[test]
    fn lee_loses_more_than_windward_gains() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(6, 1);
        let terrain = TerrainMap::from_land(dims, &vec![true; dims.len()]);
        let mut tags = StoryTags::default();
        tags.orogeny.windward.insert(1);
        tags.orogeny.lee.insert(4);
        let mut rain = vec![100.0; dims.len()];
        orogeny_flanks(&mut rain, &terrain, &tags, &cfg.story.orogeny);
        assert_eq!(rain[1], 105.0);
        // 8 plus round(8 * 0.2)
        assert_eq!(rain[4], 90.0);
    }

    #[test]
    fn paradise_and_volcanic_deltas_stack() {
        let cfg = resolve(&json!({})).unwrap();
        let dims = Dims::new(9, 9);
        let terrain = TerrainMap::from_land(dims, &vec![true; dims.len()]);
        let mut tags = StoryTags::default();
        tags.hotspots.paradise.insert(dims.idx(3, 4));
        tags.hotspots.volcanic.insert(dims.idx(5, 4));
        let mut rain = vec![100.0; dims.len()];
        hotspot_islands(&mut rain, &flat(dims, 100.0), &terrain, &tags, &cfg.microclimate);
        assert_eq!(rain[dims.idx(4, 4)], 114.0);
        assert_eq!(rain[dims.idx(1, 4)], 106.0);
        assert_eq!(rain[dims.idx(8, 8)], 100.0);
    }

    #[test]
    fn fast_currents_wet_their_coasts() {
        let dims = Dims::new(4, 1);
        let terrain = TerrainMap::from_land(dims, &[false, true, true, false]);
        let currents = CurrentField {
            u: vec![127.0, 0.0, 0.0, 0.0],
            v: vec![0.0; 4],
            basin: vec![Some(0), None, None, Some(1)],
            gyres: 0,
        };
        let mut rain = vec![100.0; dims.len()];
        let touched = current_humidity(&mut rain, &terrain, &currents, 0.4);
        assert_eq!(touched, 1);
        assert_eq!(rain[1], 104.0);
        assert_eq!(rain[2], 100.0, "a still sea adds nothing");
    }
}
