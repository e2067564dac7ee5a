//! Error types for success stories.

use thiserror::Error;

use crate::db::DbError;

/// Success story error type.
#[derive(Debug, Error)]
pub enum StoryError {
    /// Input failed validation.
    #[error("validation error: {0}")]
    Validation(String),
    /// No story with the given id.
    #[error("Story not found")]
    NotFound,
    /// Table-store failure.
    #[error("database error: {0}")]
    Db(#[from] DbError),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias for story operations.
pub type StoryResult<T> = Result<T, StoryError>;
