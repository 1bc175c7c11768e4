//! Error and result definitions used in this crate.

use thiserror::Error;

use crate::model::Deduction;

/// Problems with the grid dimensions or the per-cell inputs that go with them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Invalid grid dimensions {rows}x{cols} (at most {max_cells} cells)")]
    InvalidDimensions {
        rows: usize,
        cols: usize,
        max_cells: usize,
    },

    #[error("Expected {expected} character names but got {actual}")]
    NameCountMismatch { expected: usize, actual: usize },

    #[error("Expected {expected} roles but got {actual}")]
    RoleCountMismatch { expected: usize, actual: usize },

    #[error("Cell ({row}, {col}) lies outside the grid")]
    OutOfBounds { row: usize, col: usize },

    #[error("Characters are laid out for a different grid than {rows}x{cols}")]
    ShapeMismatch { rows: usize, cols: usize },
}

/// Raised when a persisted parts tuple cannot be decoded into a clue. Callers
/// at the formatting and deduction boundary degrade instead of failing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PartsError {
    #[error("Clue parts are empty")]
    Empty,

    #[error("Unknown clue opcode {0:?}")]
    UnknownOpcode(String),

    #[error("Opcode {opcode:?} expects {expected} parameters, got {actual}")]
    WrongArity {
        opcode: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown role label {0:?}")]
    BadRole(String),

    #[error("Expected a non-negative number at position {0}")]
    BadNumber(usize),
}

/// A persisted puzzle whose recorded deductions cannot be reproduced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Step {step} has undecodable parts: {source}")]
    Undecodable {
        step: usize,
        #[source]
        source: PartsError,
    },

    #[error("Step {step} is spoken by someone not yet deduced")]
    SpeakerUnknown { step: usize },

    #[error("Clues are contradictory after step {step}")]
    Unsatisfiable { step: usize },

    #[error("Step {step} records {expected:?} but deduces {actual:?}")]
    Mismatch {
        step: usize,
        expected: Vec<Deduction>,
        actual: Vec<Deduction>,
    },
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Failed to generate a fully deducible puzzle after {attempts} attempts")]
    Exhausted { attempts: usize },
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Unable to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Syntactic sugar for `Result<V, GridError>`.
pub type GridResult<V> = Result<V, GridError>;
