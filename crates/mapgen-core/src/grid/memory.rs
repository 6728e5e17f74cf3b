use noise::{NoiseFn, Perlin};
use rand::Rng;

use super::{Biome, GridPort};
use crate::config::FeatureKey;
use crate::error::GridError;
use crate::rng::stage_rng;

/// In-memory grid, row-major, north edge at row 0.
#[derive(Debug, Clone)]
pub struct MemoryGrid {
    pub width: usize,
    pub height: usize,
    pub elevation: Vec<f64>,
    pub engine_rainfall: Vec<f64>,
    pub rivers: Vec<bool>,
    pub wonders: Vec<bool>,
    pub biomes: Vec<Biome>,
    pub rainfall: Vec<f64>,
    pub features: Vec<Option<FeatureKey>>,
    pub starts: Vec<(usize, usize)>,
}

impl MemoryGrid {
    /// Flat grid: zero elevation, uniform rainfall, plains, no rivers.
    pub fn new(width: usize, height: usize) -> Self {
        let n = width * height;
        Self {
            width,
            height,
            elevation: vec![0.0; n],
            engine_rainfall: vec![80.0; n],
            rivers: vec![false; n],
            wonders: vec![false; n],
            biomes: vec![Biome::Plains; n],
            rainfall: vec![0.0; n],
            features: vec![None; n],
            starts: Vec::new(),
        }
    }

    /// A plausible stand-in for an engine grid: Perlin relief, banded engine
    /// rainfall, downhill river traces and a latitude-derived biome.
    pub fn synthetic(seed: u64, width: usize, height: usize) -> Self {
        let mut grid = Self::new(width, height);
        if width == 0 || height == 0 {
            return grid;
        }

        let relief = Perlin::new((seed ^ 0x7E11_A5E0) as u32);
        let wet = Perlin::new((seed ^ 0x0D2E_C1A7) as u32);
        let fx = 3.0 / width as f64;
        let fy = 3.0 / height as f64;

        for y in 0..height {
            let lat = row_latitude(y, height);
            for x in 0..width {
                let i = y * width + x;
                let (sx, sy) = (x as f64 * fx, y as f64 * fy);
                let mut v = 0.0;
                let mut amp = 1.0;
                let mut freq = 1.0;
                for _ in 0..4 {
                    v += amp * relief.get([sx * freq, sy * freq]);
                    amp *= 0.5;
                    freq *= 2.0;
                }
                let h = ((v / 1.875 + 1.0) * 0.5).clamp(0.0, 1.0);
                grid.elevation[i] = (h * h * 1400.0).round();

                let jitter = wet.get([sx * 2.0, sy * 2.0]) * 15.0;
                grid.engine_rainfall[i] = (band_rainfall(lat) + jitter).clamp(0.0, 200.0).round();
                grid.biomes[i] = latitude_biome(lat, grid.engine_rainfall[i]);
            }
        }

        grid.trace_rivers(seed);
        if width >= 4 && height >= 2 {
            grid.starts = vec![(width / 4, height / 2), (3 * width / 4, height / 2)];
        }
        grid
    }

    pub fn with_wonder(mut self, x: usize, y: usize) -> Self {
        if x < self.width && y < self.height {
            self.wonders[y * self.width + x] = true;
        }
        self
    }

    #[inline]
    pub fn get_feature(&self, x: usize, y: usize) -> Option<FeatureKey> {
        self.features[y * self.width + x]
    }

    fn trace_rivers(&mut self, seed: u64) {
        let mut rng = stage_rng(seed, 0x51EE_0F00_D0C5);
        let (w, h) = (self.width, self.height);
        let sources = (w * h / 400).max(1);
        for _ in 0..sources {
            let mut x = rng.gen_range(0..w);
            let mut y = rng.gen_range(0..h);
            for _ in 0..(w + h) {
                let i = y * w + x;
                self.rivers[i] = true;
                let mut best = (self.elevation[i], x, y);
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                        if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                            continue;
                        }
                        let e = self.elevation[ny as usize * w + nx as usize];
                        if e < best.0 {
                            best = (e, nx as usize, ny as usize);
                        }
                    }
                }
                if (best.1, best.2) == (x, y) {
                    break;
                }
                x = best.1;
                y = best.2;
            }
        }
    }

    fn check(&self, x: usize, y: usize) -> Result<usize, GridError> {
        if x >= self.width || y >= self.height {
            return Err(GridError::OutOfBounds { x, y, width: self.width, height: self.height });
        }
        Ok(y * self.width + x)
    }
}

fn row_latitude(y: usize, height: usize) -> f64 {
    90.0 - (y as f64 + 0.5) * 180.0 / height as f64
}

fn band_rainfall(lat: f64) -> f64 {
    match lat.abs() {
        a if a < 10.0 => 130.0,
        a if a < 25.0 => 90.0,
        a if a < 40.0 => 70.0,
        a if a < 60.0 => 85.0,
        _ => 50.0,
    }
}

fn latitude_biome(lat: f64, rain: f64) -> Biome {
    match lat.abs() {
        a if a >= 75.0 => Biome::Snow,
        a if a >= 60.0 => Biome::Tundra,
        a if (18.0..35.0).contains(&a) && rain < 75.0 => Biome::Desert,
        a if a < 20.0 => Biome::Tropical,
        a if a < 45.0 => Biome::Grassland,
        _ => Biome::Plains,
    }
}

impl GridPort for MemoryGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn latitude(&self, y: usize) -> Result<f64, GridError> {
        self.check(0, y)?;
        Ok(row_latitude(y, self.height))
    }

    fn elevation(&self, x: usize, y: usize) -> Result<f64, GridError> {
        Ok(self.elevation[self.check(x, y)?])
    }

    fn engine_rainfall(&self, x: usize, y: usize) -> Result<f64, GridError> {
        Ok(self.engine_rainfall[self.check(x, y)?])
    }

    fn is_river(&self, x: usize, y: usize) -> Result<bool, GridError> {
        Ok(self.rivers[self.check(x, y)?])
    }

    fn natural_wonder(&self, x: usize, y: usize) -> Result<bool, GridError> {
        Ok(self.wonders[self.check(x, y)?])
    }

    fn biome(&self, x: usize, y: usize) -> Result<Biome, GridError> {
        Ok(self.biomes[self.check(x, y)?])
    }

    fn start_positions(&self) -> Result<Vec<(usize, usize)>, GridError> {
        Ok(self.starts.clone())
    }

    fn set_rainfall(&mut self, x: usize, y: usize, rainfall: f64) -> Result<(), GridError> {
        let i = self.check(x, y)?;
        self.rainfall[i] = rainfall;
        Ok(())
    }

    fn set_biome(&mut self, x: usize, y: usize, biome: Biome) -> Result<(), GridError> {
        let i = self.check(x, y)?;
        self.biomes[i] = biome;
        Ok(())
    }

    fn set_feature(&mut self, x: usize, y: usize, feature: Option<FeatureKey>) -> Result<(), GridError> {
        let i = self.check(x, y)?;
        self.features[i] = feature;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_is_deterministic() {
        let a = MemoryGrid::synthetic(11, 40, 24);
        let b = MemoryGrid::synthetic(11, 40, 24);
        assert_eq!(a.elevation, b.elevation);
        assert_eq!(a.rivers, b.rivers);
    }

    #[test]
    fn synthetic_fields_stay_in_range() {
        let g = MemoryGrid::synthetic(5, 48, 32);
        assert!(g.elevation.iter().all(|e| (0.0..=1400.0).contains(e)));
        assert!(g.engine_rainfall.iter().all(|r| (0.0..=200.0).contains(r)));
        assert!(g.rivers.iter().any(|r| *r), "at least one river trace");
    }

    #[test]
    fn out_of_bounds_write_is_an_error() {
        let mut g = MemoryGrid::new(4, 4);
        let err = g.set_rainfall(4, 0, 10.0).unwrap_err();
        assert!(matches!(err, GridError::OutOfBounds { x: 4, y: 0, .. }), "got {err:?}");
    }
}
