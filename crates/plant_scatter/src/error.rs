//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! malformed terrain input, invalid configuration, unsatisfiable sampling density,
//! non-finite values met during placement, species lookups outside the loaded table,
//! pipeline misuse, worker pool setup, IO, and generic errors.
use thiserror::Error;

use crate::ecosystem::Stage;
use crate::grid::PointPass;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("dimension mismatch for {what}: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        what: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error(
        "pink noise generation failed in {pass} pass: cell {cell} placed {placed} of {target} points"
    )]
    GenerationFailed {
        pass: PointPass,
        cell: usize,
        placed: usize,
        target: usize,
    },

    #[error("non-finite abiotic conditions at pixel {pixel:?}")]
    NonFiniteConditions { pixel: (usize, usize) },

    #[error("unknown species '{name}'")]
    UnknownSpecies { name: String },

    #[error("pipeline stage {actual:?} cannot run this step (requires {expected:?})")]
    InvalidStage { expected: Stage, actual: Stage },

    #[error("worker pool error: {0}")]
    WorkerPool(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is the terminal "pink noise generation failed" signal.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Error::GenerationFailed { .. })
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
