//! HTTP error mapping.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{
    JsonRejection, PathRejection, QueryRejection,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::conversation::ConversationError;
use crate::knowledge_hub::KnowledgeHubError;
use crate::stories::StoryError;

/// Error returned by route handlers, rendered as `{"detail": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// 404.
    NotFound(String),
    /// 401.
    Unauthorized,
    /// 422.
    Unprocessable(String),
    /// 502: the database call failed.
    Upstream(String),
    /// 500.
    Internal(String),
}

impl ApiError {
    /// Status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> &str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::NotFound(detail)
            | Self::Unprocessable(detail)
            | Self::Upstream(detail)
            | Self::Internal(detail) => detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, detail = self.detail(), "Request failed");
        }
        (status, Json(json!({"detail": self.detail()}))).into_response()
    }
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::InvalidInput(msg) => Self::Unprocessable(msg),
            ConversationError::Db(e) => Self::Upstream(format!("Database error: {e}")),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StoryError> for ApiError {
    fn from(err: StoryError) -> Self {
        match err {
            StoryError::NotFound => Self::NotFound("Story not found".to_string()),
            StoryError::Validation(msg) => Self::Unprocessable(msg),
            StoryError::Db(e) => Self::Upstream(format!("Database error: {e}")),
            StoryError::Serialization(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<KnowledgeHubError> for ApiError {
    fn from(err: KnowledgeHubError) -> Self {
        match err {
            KnowledgeHubError::Db(e) => Self::Upstream(format!("Database error: {e}")),
            KnowledgeHubError::InvalidItem(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Unprocessable(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Unprocessable(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Unprocessable(rejection.body_text())
    }
}
