//! Error types for the conversation subsystem.

use thiserror::Error;

use crate::db::DbError;

/// Conversation subsystem error type.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Caller-supplied input rejected before touching the store.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Table-store failure.
    #[error("database error: {0}")]
    Db(#[from] DbError),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias for conversation operations.
pub type ConversationResult<T> = Result<T, ConversationError>;
