//! Error types surfaced by config resolution and by the injected grid port.
//!
//! Range clamps and degraded stages are not errors; they are reported on
//! `config::Resolution` and `pipeline::StageReport` respectively.

use thiserror::Error;

/// Fatal, pre-run: the raw config names something a closed section does not allow.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("{path} contains unknown {what} keys: {}", keys.join(", "))]
    UnknownKeys {
        path: String,
        what: &'static str,
        keys: Vec<String>,
    },

    #[error("{path} must be one of [{}], got {value:?}", allowed.join(", "))]
    InvalidChoice {
        path: String,
        value: String,
        allowed: Vec<&'static str>,
    },

    /// The schema produced a tree the typed config could not absorb.
    #[error("resolved config does not match its typed shape: {0}")]
    Shape(String),
}

/// Failure reported by a [`crate::grid::GridPort`] implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("plot ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("grid backend failure: {0}")]
    Backend(String),
}

/// Fatal, mid-run: the grid port failed while a stage was reading or publishing.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("stage `{stage}` failed against the grid port")]
pub struct EngineIntegrationError {
    pub stage: &'static str,
    #[source]
    pub source: GridError,
}

impl EngineIntegrationError {
    pub fn new(stage: &'static str, source: GridError) -> Self {
        Self { stage, source }
    }
}

/// Everything [`crate::pipeline::MapGenerator::generate`] can fail with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    #[error(transparent)]
    Engine(#[from] EngineIntegrationError),
}

impl GenerationError {
    /// Name of the stage that aborted the run, if the grid port was at fault.
    pub fn failed_stage(&self) -> Option<&'static str> {
        match self {
            GenerationError::Engine(e) => Some(e.stage),
            GenerationError::Config(_) => None,
        }
    }
}
