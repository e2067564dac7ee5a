//! Knowledge hub endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use crate::knowledge_hub::{KnowledgeHubItem, KnowledgeHubQuery};

use super::error::ApiError;
use super::extract::{ApiPath, ApiQuery};
use super::state::AppState;

/// Query of `GET /api/knowledge-hub/{slug}`.
#[derive(Debug, Deserialize)]
pub struct LangParams {
    /// Response language.
    pub lang: Option<String>,
}

/// List articles.
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<KnowledgeHubQuery>,
) -> Result<Json<Vec<KnowledgeHubItem>>, ApiError> {
    Ok(Json(state.knowledge_hub.list(&params).await?))
}

/// One article by slug.
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(params): ApiQuery<LangParams>,
) -> Result<Json<KnowledgeHubItem>, ApiError> {
    let lang = params
        .lang
        .as_deref()
        .unwrap_or(crate::conversation::DEFAULT_LANGUAGE);
    state
        .knowledge_hub
        .get_by_slug(&slug, lang)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Knowledge Hub item not found".to_string()))
}
