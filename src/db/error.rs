//! Error types for the table-store layer.

use thiserror::Error;

/// Table-store error type.
#[derive(Debug, Error)]
pub enum DbError {
    /// HTTP transport failure talking to the REST endpoint.
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The REST endpoint answered with a non-success status.
    #[error("database responded with status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by the server.
        body: String,
    },

    /// Invalid base URL or table path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Insert call returned no representation of the new row.
    #[error("insert into {0} returned no row")]
    EmptyInsert(String),

    /// A row passed to the store was not a JSON object.
    #[error("row for table {0} must be a JSON object")]
    NotAnObject(String),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Failure injected or raised by a non-HTTP backend.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Convenience result alias for table-store operations.
pub type DbResult<T> = Result<T, DbError>;
