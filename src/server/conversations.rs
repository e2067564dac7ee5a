//! Conversation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::conversation::{ConversationRow, HistoryTurn, MediaLinks, MessageType};

use super::error::ApiError;
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::state::AppState;

/// Body of `POST /api/conversations/{user_id}/messages`.
#[derive(Debug, Deserialize)]
pub struct AppendMessageRequest {
    /// Turn text.
    pub text: String,
    /// Language tag, `en` when absent.
    pub language: Option<String>,
    /// Producer of the turn.
    pub role: MessageType,
    /// Recommended video (assistant turns).
    pub youtube_link: Option<String>,
    /// Recommended infographic (assistant turns).
    pub infographic_url: Option<String>,
}

/// Query of `GET /api/conversations/{user_id}/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Turns to return.
    pub limit: Option<usize>,
}

/// Save one turn.
pub async fn append_message(
    State(state): State<Arc<AppState>>,
    ApiPath(user_id): ApiPath<String>,
    ApiJson(request): ApiJson<AppendMessageRequest>,
) -> Result<(StatusCode, Json<ConversationRow>), ApiError> {
    let links = MediaLinks::new(
        request.youtube_link.as_deref(),
        request.infographic_url.as_deref(),
    );
    let row = state
        .messages
        .append(
            &user_id,
            &request.text,
            request.language.as_deref(),
            request.role,
            Some(links),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Latest turns, oldest first.
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    ApiPath(user_id): ApiPath<String>,
    ApiQuery(params): ApiQuery<HistoryParams>,
) -> Result<Json<Vec<HistoryTurn>>, ApiError> {
    let turns = match params.limit {
        Some(limit) => state.history.fetch(&user_id, limit).await?,
        None => state.history.fetch_default(&user_id).await?,
    };
    Ok(Json(turns))
}
