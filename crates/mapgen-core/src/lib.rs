//! Story-driven map generation over an engine-owned tile grid.
//!
//! [`pipeline::MapGenerator`] resolves a partial JSON config, reads the grid
//! once through a [`grid::GridPort`], runs the landmass, story, corridor,
//! climate, biome and feature stages, and writes rainfall, biomes and
//! features back.

pub mod climate;
pub mod config;
pub mod corridors;
pub mod ecology;
pub mod error;
pub mod features;
pub mod fractal;
pub mod grid;
pub mod landmass;
pub mod pipeline;
pub mod rng;
pub mod story;
pub mod tags;
pub mod world;

pub use config::{resolve, resolve_with_report, ResolvedConfig};
pub use error::{ConfigValidationError, EngineIntegrationError, GenerationError, GridError};
pub use grid::{Biome, GridPort, MemoryGrid};
pub use pipeline::{MapGenerator, MapResult, StageReport};
