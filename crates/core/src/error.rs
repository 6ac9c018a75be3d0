//! Error types for Landflow

use crate::grid::GridKind;
use thiserror::Error;

/// Main error type for Landflow operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{component} is not implemented for {kind} grids, use a Voronoi or hex grid instead")]
    UnsupportedGrid {
        component: &'static str,
        kind: GridKind,
    },

    #[error("Index out of bounds: {index} in array of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Size mismatch for {what}: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Field not found at node: {0}")]
    FieldNotFound(String),

    #[error("Field already exists at node: {0}")]
    FieldExists(String),

    #[error("Field {name} holds {actual} values, not {expected}")]
    FieldType {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),
}

/// Result type alias for Landflow operations
pub type Result<T> = std::result::Result<T, Error>;
