//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::store::StoreError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("garden already exists: {0}")]
    Conflict(String),

    #[error("garden not found: {0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Coarse classification used by the CLI and HTTP surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Internal,
}

impl ApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::Domain(_) => ErrorKind::Validation,
            ApplicationError::Conflict(_) => ErrorKind::Conflict,
            ApplicationError::NotFound(_) => ErrorKind::NotFound,
            ApplicationError::Storage(_)
            | ApplicationError::Config { .. }
            | ApplicationError::OperationFailed { .. } => ErrorKind::Internal,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
