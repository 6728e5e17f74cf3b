//! Land/water mask with shallow-coast bookkeeping.

use serde::{Deserialize, Serialize};

use crate::grid::Dims;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Ocean,
    /// Shallow water touching land.
    Coast,
    Land,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainMap {
    pub dims: Dims,
    cells: Vec<Terrain>,
}

impl TerrainMap {
    pub fn ocean(dims: Dims) -> Self {
        Self { dims, cells: vec![Terrain::Ocean; dims.len()] }
    }

    pub fn from_land(dims: Dims, land: &[bool]) -> Self {
        let cells = land.iter().map(|&l| if l { Terrain::Land } else { Terrain::Ocean }).collect();
        let mut map = Self { dims, cells };
        map.refresh_shallows();
        map
    }

    #[inline]
    pub fn get(&self, i: usize) -> Terrain {
        self.cells[i]
    }

    #[inline]
    pub fn is_land(&self, i: usize) -> bool {
        self.cells[i] == Terrain::Land
    }

    #[inline]
    pub fn is_water(&self, i: usize) -> bool {
        self.cells[i] != Terrain::Land
    }

    #[inline]
    pub fn is_shallow(&self, i: usize) -> bool {
        self.cells[i] == Terrain::Coast
    }

    pub fn touches_water(&self, i: usize) -> bool {
        self.dims.neighbors(i).any(|j| self.is_water(j))
    }

    pub fn touches_land(&self, i: usize) -> bool {
        self.dims.neighbors(i).any(|j| self.is_land(j))
    }

    pub fn is_coastal_land(&self, i: usize) -> bool {
        self.is_land(i) && self.touches_water(i)
    }

    /// Any land within Chebyshev `radius`, excluding `i` itself.
    pub fn near_land(&self, i: usize, radius: u32) -> bool {
        self.dims.within(i, radius).any(|j| j != i && self.is_land(j))
    }

    /// Turn a plot into land; surrounding water becomes shallow.
    pub fn raise(&mut self, i: usize) {
        self.cells[i] = Terrain::Land;
        let dims = self.dims;
        for j in dims.neighbors(i) {
            if self.cells[j] == Terrain::Ocean {
                self.cells[j] = Terrain::Coast;
            }
        }
    }

    /// Turn a plot into shallow water.
    pub fn flood(&mut self, i: usize) {
        self.cells[i] = Terrain::Coast;
    }

    /// Mark open water as shallow without touching land.
    pub fn shoal(&mut self, i: usize) {
        if self.cells[i] == Terrain::Ocean {
            self.cells[i] = Terrain::Coast;
        }
    }

    /// Water touching land is shallow, all other water is open ocean.
    pub fn refresh_shallows(&mut self) {
        for i in 0..self.cells.len() {
            if self.is_water(i) {
                self.cells[i] = if self.touches_land(i) { Terrain::Coast } else { Terrain::Ocean };
            }
        }
    }

    pub fn land_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Terrain::Land).count()
    }

    pub fn land_mask(&self) -> Vec<bool> {
        self.cells.iter().map(|c| *c == Terrain::Land).collect()
    }

    pub fn water_mask(&self) -> Vec<bool> {
        self.cells.iter().map(|c| *c != Terrain::Land).collect()
    }
}
