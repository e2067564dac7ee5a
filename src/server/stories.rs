//! Success story endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::stories::{StoryConsent, StoryCreate, StoryResponse, StoryUpdateStatus};

use super::auth::RequireAdmin;
use super::error::ApiError;
use super::extract::{ApiJson, ApiPath};
use super::state::AppState;

/// Multipart field holding the photo.
const PHOTO_FIELD: &str = "photo";

/// Create a draft.
pub async fn create_draft(
    State(state): State<Arc<AppState>>,
    ApiJson(story): ApiJson<StoryCreate>,
) -> Result<(StatusCode, Json<StoryResponse>), ApiError> {
    let created = state.stories.create_draft(story).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Record consent.
pub async fn record_consent(
    State(state): State<Arc<AppState>>,
    ApiJson(consent): ApiJson<StoryConsent>,
) -> Result<Json<StoryResponse>, ApiError> {
    Ok(Json(state.stories.record_consent(consent.id).await?))
}

/// Published stories.
pub async fn list_published(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StoryResponse>>, ApiError> {
    Ok(Json(state.stories.list_published().await?))
}

/// One story.
pub async fn get_story(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<StoryResponse>, ApiError> {
    Ok(Json(state.stories.get_by_id(id).await?))
}

/// Moderate a story (admin only).
pub async fn update_status(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<StoryUpdateStatus>,
) -> Result<Json<StoryResponse>, ApiError> {
    Ok(Json(state.stories.update_status(id, body.status).await?))
}

/// Accept a photo and return the address it is published under.
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Unprocessable(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let photo_url = state.stories.photo_url(&filename);
        return Ok((StatusCode::CREATED, Json(json!({"photo_url": photo_url}))));
    }
    Err(ApiError::Unprocessable(format!(
        "missing {PHOTO_FIELD} file field"
    )))
}
