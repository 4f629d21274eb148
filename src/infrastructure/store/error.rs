//! Persistence errors shared by all store adapters

use thiserror::Error;

use crate::domain::GardenId;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("garden name already exists: {0}")]
    DuplicateGarden(String),

    #[error("garden no longer exists: {0}")]
    MissingGarden(GardenId),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("json document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
