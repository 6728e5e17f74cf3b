//! Per-plot ecology indices: surface temperature, effective moisture,
//! aridity, freeze and vegetation density, plus the biome symbol the feature
//! rules key on.

use crate::config::BiomeSymbol;
use crate::grid::{per_plot, Biome, Surface};
use crate::landmass::TerrainMap;

// ── Constants ─────────────────────────────────────────────────────────────────

const EQUATOR_TEMP: f64 = 28.0;
const POLE_TEMP: f64 = -8.0;
/// Degrees lost per 1000 elevation units.
const LAPSE_RATE: f64 = 6.5;

const POLAR_CUTOFF: f64 = -5.0;
const TUNDRA_CUTOFF: f64 = 2.0;
const MID_LATITUDE: f64 = 12.0;
const TROPICAL: f64 = 24.0;

/// Moisture breakpoints: arid, semi-arid, humid, wet.
const MOISTURE: [f64; 4] = [45.0, 90.0, 140.0, 190.0];
const HUMIDITY_RADIUS: u32 = 2;
const HUMIDITY_WEIGHT: f64 = 0.35;

const PET_BASE: f64 = 20.0;
const PET_TEMP_WEIGHT: f64 = 80.0;
const PET_TEMP_SPAN: f64 = 35.0;

const FREEZE_WARM: f64 = 2.0;
const FREEZE_COLD: f64 = -10.0;

const VEG_BASE: f64 = 0.2;
const VEG_MOISTURE_WEIGHT: f64 = 0.55;
const VEG_HUMIDITY_WEIGHT: f64 = 0.25;
const VEG_MOISTURE_NORM: f64 = 120.0 + 40.0;
const VEG_ARIDITY_PENALTY: f64 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct EcologyIndices {
    /// Degrees Celsius.
    pub temperature: Vec<f64>,
    /// Rainfall lifted by nearby open water.
    pub moisture: Vec<f64>,
    pub aridity: Vec<f64>,
    pub freeze: Vec<f64>,
    pub vegetation: Vec<f64>,
    pub symbol: Vec<BiomeSymbol>,
}

#[derive(Debug, Clone, Copy)]
struct PlotIndex {
    temperature: f64,
    moisture: f64,
    aridity: f64,
    freeze: f64,
    vegetation: f64,
    symbol: BiomeSymbol,
}

pub fn temperature(abs_lat: f64, elevation: f64, land: bool) -> f64 {
    let t = EQUATOR_TEMP + (POLE_TEMP - EQUATOR_TEMP) * (abs_lat / 90.0).clamp(0.0, 1.0);
    if land {
        t - LAPSE_RATE * elevation.max(0.0) / 1000.0
    } else {
        t
    }
}

pub fn aridity(temperature: f64, moisture: f64) -> f64 {
    let pet = PET_BASE + PET_TEMP_WEIGHT * (temperature / PET_TEMP_SPAN).clamp(0.0, 1.0);
    ((pet - moisture) / pet).clamp(0.0, 1.0)
}

pub fn freeze(temperature: f64) -> f64 {
    ((FREEZE_WARM - temperature) / (FREEZE_WARM - FREEZE_COLD)).clamp(0.0, 1.0)
}

/// Symbol for a plot from its designated biome and indices.
pub fn symbol_for(biome: Biome, temperature: f64, moisture: f64) -> BiomeSymbol {
    if temperature <= POLAR_CUTOFF {
        return BiomeSymbol::Snow;
    }
    match biome {
        Biome::Snow => BiomeSymbol::Snow,
        Biome::Tundra if temperature > TUNDRA_CUTOFF && moisture >= MOISTURE[0] => BiomeSymbol::Boreal,
        Biome::Tundra => BiomeSymbol::Tundra,
        Biome::Desert => BiomeSymbol::Desert,
        Biome::Tropical if moisture >= MOISTURE[2] => BiomeSymbol::TropicalRainforest,
        Biome::Tropical => BiomeSymbol::TropicalSeasonal,
        Biome::Plains | Biome::Grassland | Biome::Marine => {
            if temperature < TUNDRA_CUTOFF {
                BiomeSymbol::Tundra
            } else if temperature < MID_LATITUDE && moisture >= MOISTURE[0] {
                BiomeSymbol::Boreal
            } else if moisture < MOISTURE[0] && temperature >= MID_LATITUDE {
                BiomeSymbol::Desert
            } else if temperature >= TROPICAL {
                if moisture >= MOISTURE[3] {
                    BiomeSymbol::TropicalRainforest
                } else {
                    BiomeSymbol::TropicalSeasonal
                }
            } else if moisture >= MOISTURE[1] {
                BiomeSymbol::TemperateHumid
            } else {
                BiomeSymbol::TemperateDry
            }
        }
    }
}

/// Compute every index from final rainfall and designated biomes.
pub fn classify(surface: &Surface, terrain: &TerrainMap, rain: &[f64], biome: &[Biome]) -> EcologyIndices {
    let dims = surface.dims;
    let plots = per_plot(dims.len(), |i| {
        let land = terrain.is_land(i);
        let t = temperature(surface.lat_of(i).abs(), surface.elevation[i], land);
        let around = dims.within(i, HUMIDITY_RADIUS).filter(|&j| j != i);
        let (water, total) = around.fold((0usize, 0usize), |(w, n), j| (w + usize::from(terrain.is_water(j)), n + 1));
        let humidity = if total == 0 { 0.0 } else { water as f64 / total as f64 };
        let moisture = rain[i] * (1.0 + HUMIDITY_WEIGHT * humidity);
        let arid = aridity(t, moisture);
        let frz = freeze(t);
        let vegetation = if land {
            let moist = (moisture / VEG_MOISTURE_NORM).clamp(0.0, 1.0);
            let v = VEG_BASE + VEG_MOISTURE_WEIGHT * moist + VEG_HUMIDITY_WEIGHT * humidity
                - VEG_ARIDITY_PENALTY * arid;
            (v * (1.0 - frz)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        PlotIndex {
            temperature: t,
            moisture,
            aridity: arid,
            freeze: frz,
            vegetation,
            symbol: symbol_for(biome[i], t, moisture),
        }
    });

    EcologyIndices {
        temperature: plots.iter().map(|p| p.temperature).collect(),
        moisture: plots.iter().map(|p| p.moisture).collect(),
        aridity: plots.iter().map(|p| p.aridity).collect(),
        freeze: plots.iter().map(|p| p.freeze).collect(),
        vegetation: plots.iter().map(|p| p.vegetation).collect(),
        symbol: plots.iter().map(|p| p.symbol).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Dims;
    use approx::assert_relative_eq;

    fn strip(lats: &[f64], rain: f64) -> (Surface, TerrainMap) {
        let dims = Dims::new(6, lats.len());
        let surface = Surface {
            dims,
            latitude: lats.to_vec(),
            elevation: vec![100.0; dims.len()],
            engine_rainfall: vec![rain; dims.len()],
            river: vec![false; dims.len()],
            wonder: vec![false; dims.len()],
            biome: vec![Biome::Plains; dims.len()],
            starts: Vec::new(),
        };
        (surface, TerrainMap::from_land(dims, &vec![true; dims.len()]))
    }

    #[test]
    fn indices_stay_in_unit_range() {
        let (surface, terrain) = strip(&[85.0, 60.0, 30.0, 0.0, -45.0], 120.0);
        let rain = vec![120.0; surface.dims.len()];
        let biome = vec![Biome::Grassland; surface.dims.len()];
        let eco = classify(&surface, &terrain, &rain, &biome);
        for i in 0..surface.dims.len() {
            for (name, v) in [("aridity", eco.aridity[i]), ("freeze", eco.freeze[i]), ("vegetation", eco.vegetation[i])] {
                assert!((0.0..=1.0).contains(&v), "{name} at {i} is {v}");
            }
        }
    }

    #[test]
    fn temperature_falls_with_latitude_and_height() {
        assert_relative_eq!(temperature(0.0, 0.0, true), 28.0);
        assert_relative_eq!(temperature(90.0, 0.0, false), -8.0);
        assert_relative_eq!(temperature(0.0, 1000.0, true), 21.5);
        assert_relative_eq!(temperature(0.0, 1000.0, false), 28.0, epsilon = 1e-12);
    }

    #[test]
    fn polar_plots_freeze_and_go_bare() {
        let (surface, terrain) = strip(&[88.0, 0.0], 100.0);
        let rain = vec![100.0; surface.dims.len()];
        let biome = vec![Biome::Tundra; surface.dims.len()];
        let eco = classify(&surface, &terrain, &rain, &biome);
        assert_eq!(eco.symbol[0], BiomeSymbol::Snow);
        assert!(eco.freeze[0] > 0.8, "freeze {}", eco.freeze[0]);
        assert!(eco.vegetation[0] < 0.15, "vegetation {}", eco.vegetation[0]);
        assert!(eco.vegetation[6] > 0.5, "warm wet land is well vegetated: {}", eco.vegetation[6]);
    }

    #[test]
    fn dry_heat_is_arid() {
        assert!(aridity(30.0, 20.0) > 0.7);
        assert_relative_eq!(aridity(30.0, 150.0), 0.0);
        assert_eq!(symbol_for(Biome::Plains, 26.0, 30.0), BiomeSymbol::Desert);
        assert_eq!(symbol_for(Biome::Tropical, 26.0, 160.0), BiomeSymbol::TropicalRainforest);
        assert_eq!(symbol_for(Biome::Grassland, 16.0, 100.0), BiomeSymbol::TemperateHumid);
    }
}
