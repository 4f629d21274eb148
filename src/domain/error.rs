//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent rejected input before anything reaches a store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("garden name must not be empty")]
    EmptyGardenName,

    #[error("garden dimensions must be positive: {rows}x{cols}")]
    InvalidDimensions { rows: i64, cols: i64 },

    #[error("invalid upload file name: {0:?}")]
    InvalidFileName(String),
}
