//! Success story drafts, consent and moderation.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use crate::db::{Filter, Order, SelectQuery, TableStore};
use crate::stories::error::{StoryError, StoryResult};
use crate::stories::types::{STORIES_TABLE, StoryCreate, StoryResponse, StoryStatus};

/// Reads and writes the success story table.
#[derive(Clone)]
pub struct StoryService {
    db: Arc<dyn TableStore>,
    table: String,
    upload_base_url: String,
}

impl StoryService {
    /// Create a service over `db`; uploaded photos are addressed under `upload_base_url`.
    #[must_use]
    pub fn new(db: Arc<dyn TableStore>, upload_base_url: impl Into<String>) -> Self {
        Self {
            db,
            table: STORIES_TABLE.to_string(),
            upload_base_url: upload_base_url.into(),
        }
    }

    /// Save a validated draft as pending, without consent.
    ///
    /// # Errors
    /// Returns an error if validation or the insert fails.
    pub async fn create_draft(&self, story: StoryCreate) -> StoryResult<StoryResponse> {
        story.validate()?;

        let mut row = serde_json::to_value(&story)?;
        if let Value::Object(object) = &mut row {
            object.insert("status".to_string(), json!(StoryStatus::Pending.as_str()));
            object.insert("consent".to_string(), json!(false));
        }
        let inserted = self.db.insert(&self.table, row).await?;
        let created: StoryResponse = serde_json::from_value(inserted)?;
        info!(story_id = %created.id, "Story draft created");
        Ok(created)
    }

    /// Mark a story as consented.
    ///
    /// # Errors
    /// Returns [`StoryError::NotFound`] if no story has this id.
    pub async fn record_consent(&self, id: Uuid) -> StoryResult<StoryResponse> {
        self.patch_one(id, json!({"consent": true})).await
    }

    /// Change a story's moderation state.
    ///
    /// # Errors
    /// Returns [`StoryError::NotFound`] if no story has this id.
    pub async fn update_status(&self, id: Uuid, status: StoryStatus) -> StoryResult<StoryResponse> {
        let updated = self.patch_one(id, json!({"status": status.as_str()})).await?;
        info!(story_id = %id, status = status.as_str(), "Story status updated");
        Ok(updated)
    }

    /// Published stories, newest first.
    ///
    /// # Errors
    /// Returns an error if the store fails or a row does not fit the model.
    pub async fn list_published(&self) -> StoryResult<Vec<StoryResponse>> {
        let query = SelectQuery::new()
            .filter(Filter::new().eq("status", StoryStatus::Published.as_str()))
            .order(Order::desc("created_at"));
        let rows = self.db.select(&self.table, query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(StoryError::from))
            .collect()
    }

    /// Fetch one story.
    ///
    /// # Errors
    /// Returns [`StoryError::NotFound`] if no story has this id.
    pub async fn get_by_id(&self, id: Uuid) -> StoryResult<StoryResponse> {
        let query = SelectQuery::new().filter(Filter::new().eq("id", id.to_string()));
        let rows = self.db.select(&self.table, query).await?;
        let row = rows.into_iter().next().ok_or(StoryError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }

    /// Address under which an uploaded photo is published.
    #[must_use]
    pub fn photo_url(&self, filename: &str) -> String {
        let unique_name = format!("{}-{filename}", Uuid::new_v4()).replace(' ', "-");
        format!("{}/{unique_name}", self.upload_base_url)
    }

    async fn patch_one(&self, id: Uuid, patch: Value) -> StoryResult<StoryResponse> {
        let rows = self
            .db
            .update(&self.table, patch, Filter::new().eq("id", id.to_string()))
            .await?;
        let row = rows.into_iter().next().ok_or(StoryError::NotFound)?;
        Ok(serde_json::from_value(row)?)
    }
}
