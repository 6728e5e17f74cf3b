//! Tile grid: the injected port, plot addressing, and the owned snapshot the
//! pipeline works on.

pub mod memory;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::FeatureKey;
use crate::error::GridError;

pub use memory::MemoryGrid;

/// Area at which size-scaled parameters take their nominal value.
const BASE_AREA: f64 = 10_000.0;

// ── Biomes ────────────────────────────────────────────────────────────────────

/// Engine biome written back to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Biome {
    Marine,
    Tundra,
    Snow,
    Desert,
    Plains,
    Grassland,
    Tropical,
}

// ── Port ──────────────────────────────────────────────────────────────────────

/// Capabilities the host engine lends to the generator.
///
/// Reads happen once at the start of a run and writes once at the end; the
/// generator never holds on to the port between the two.
pub trait GridPort {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Latitude in degrees of row `y`, in `-90..=90`.
    fn latitude(&self, y: usize) -> Result<f64, GridError>;
    fn elevation(&self, x: usize, y: usize) -> Result<f64, GridError>;
    fn engine_rainfall(&self, x: usize, y: usize) -> Result<f64, GridError>;
    fn is_river(&self, x: usize, y: usize) -> Result<bool, GridError>;
    fn natural_wonder(&self, x: usize, y: usize) -> Result<bool, GridError>;
    fn biome(&self, x: usize, y: usize) -> Result<Biome, GridError>;
    fn start_positions(&self) -> Result<Vec<(usize, usize)>, GridError>;

    fn set_rainfall(&mut self, x: usize, y: usize, rainfall: f64) -> Result<(), GridError>;
    fn set_biome(&mut self, x: usize, y: usize, biome: Biome) -> Result<(), GridError>;
    fn set_feature(&mut self, x: usize, y: usize, feature: Option<FeatureKey>) -> Result<(), GridError>;
}

// ── Addressing ────────────────────────────────────────────────────────────────

/// Grid dimensions plus row-major index helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims {
    pub width: usize,
    pub height: usize,
}

impl Dims {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn xy(&self, i: usize) -> (usize, usize) {
        (i % self.width, i / self.width)
    }

    /// Index of `(x, y)` if it lies on the grid.
    #[inline]
    pub fn at(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            None
        } else {
            Some(self.idx(x as usize, y as usize))
        }
    }

    /// `i` shifted by `(dx, dy)`, if still on the grid.
    #[inline]
    pub fn offset(&self, i: usize, dx: i64, dy: i64) -> Option<usize> {
        let (x, y) = self.xy(i);
        self.at(x as i64 + dx, y as i64 + dy)
    }

    /// The up-to-eight surrounding plots.
    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.within(i, 1).filter(move |&j| j != i)
    }

    /// Every plot within Chebyshev distance `radius` of `i`, including `i`.
    pub fn within(&self, i: usize, radius: u32) -> impl Iterator<Item = usize> + '_ {
        let r = radius as i64;
        (-r..=r).flat_map(move |dy| (-r..=r).filter_map(move |dx| self.offset(i, dx, dy)))
    }

    /// Chebyshev distance between two plots.
    pub fn chebyshev(&self, a: usize, b: usize) -> usize {
        let (ax, ay) = self.xy(a);
        let (bx, by) = self.xy(b);
        ax.abs_diff(bx).max(ay.abs_diff(by))
    }

    /// Manhattan distance between two plots.
    pub fn manhattan(&self, a: usize, b: usize) -> usize {
        let (ax, ay) = self.xy(a);
        let (bx, by) = self.xy(b);
        ax.abs_diff(bx) + ay.abs_diff(by)
    }

    /// Chebyshev distance from every plot to the nearest seed plot, searched
    /// out to `limit` rings. Plots farther away (or with no seed at all) read
    /// `u32::MAX`.
    pub fn distance_field(&self, seeds: &[bool], limit: u32) -> Vec<u32> {
        let mut dist = vec![u32::MAX; self.len()];
        let mut queue = VecDeque::new();
        for (i, &s) in seeds.iter().enumerate() {
            if s {
                dist[i] = 0;
                queue.push_back(i);
            }
        }
        while let Some(i) = queue.pop_front() {
            let d = dist[i];
            if d >= limit {
                continue;
            }
            for j in self.neighbors(i) {
                if dist[j] == u32::MAX {
                    dist[j] = d + 1;
                    queue.push_back(j);
                }
            }
        }
        dist
    }

    /// `sqrt(area / 10000)` clamped to `0.6..=2.0`.
    pub fn sqrt_scale(&self) -> f64 {
        (self.len().max(1) as f64 / BASE_AREA).sqrt().clamp(0.6, 2.0)
    }

    /// Linear size multiplier for caps: `max(1, round(base * sqrt_scale))`
    /// when `base > 0`, else 0.
    pub fn scaled_cap(&self, base: u32) -> usize {
        if base == 0 {
            0
        } else {
            ((base as f64 * self.sqrt_scale()).round() as usize).max(1)
        }
    }
}

// ── Per-plot passes ───────────────────────────────────────────────────────────

/// Collect `f(0..n)` in index order. With the `threading` feature the calls
/// spread over the rayon pool; `f` must not depend on call order.
pub fn per_plot<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "threading")]
    {
        use rayon::prelude::*;
        (0..n).into_par_iter().map(f).collect()
    }
    #[cfg(not(feature = "threading"))]
    {
        (0..n).map(f).collect()
    }
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Everything the pipeline reads from the port, copied once.
#[derive(Debug, Clone)]
pub struct Surface {
    pub dims: Dims,
    /// Latitude per row.
    pub latitude: Vec<f64>,
    pub elevation: Vec<f64>,
    pub engine_rainfall: Vec<f64>,
    pub river: Vec<bool>,
    pub wonder: Vec<bool>,
    pub biome: Vec<Biome>,
    pub starts: Vec<usize>,
}

impl Surface {
    pub fn survey<P: GridPort + ?Sized>(port: &P) -> Result<Self, GridError> {
        let dims = Dims::new(port.width(), port.height());
        let latitude = (0..dims.height).map(|y| port.latitude(y)).collect::<Result<Vec<_>, _>>()?;

        let n = dims.len();
        let mut elevation = Vec::with_capacity(n);
        let mut engine_rainfall = Vec::with_capacity(n);
        let mut river = Vec::with_capacity(n);
        let mut wonder = Vec::with_capacity(n);
        let mut biome = Vec::with_capacity(n);
        for y in 0..dims.height {
            for x in 0..dims.width {
                elevation.push(port.elevation(x, y)?);
                engine_rainfall.push(port.engine_rainfall(x, y)?);
                river.push(port.is_river(x, y)?);
                wonder.push(port.natural_wonder(x, y)?);
                biome.push(port.biome(x, y)?);
            }
        }

        let mut starts = Vec::new();
        for (x, y) in port.start_positions()? {
            if x >= dims.width || y >= dims.height {
                return Err(GridError::OutOfBounds { x, y, width: dims.width, height: dims.height });
            }
            starts.push(dims.idx(x, y));
        }

        Ok(Self { dims, latitude, elevation, engine_rainfall, river, wonder, biome, starts })
    }

    #[inline]
    pub fn lat_of(&self, i: usize) -> f64 {
        self.latitude[i / self.dims.width]
    }
}
