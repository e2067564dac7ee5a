//! Knowledge hub reads.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::db::{DbError, Filter, Order, SelectQuery, TableStore};
use crate::knowledge_hub::types::{
    KNOWLEDGE_HUB_TABLE, KnowledgeHubItem, KnowledgeHubQuery, localize,
};

/// Knowledge hub error type.
#[derive(Debug, Error)]
pub enum KnowledgeHubError {
    /// Table-store failure.
    #[error("database error: {0}")]
    Db(#[from] DbError),
    /// A stored article does not fit the response model.
    #[error("invalid knowledge hub item: {0}")]
    InvalidItem(#[from] serde_json::Error),
}

/// Convenience result alias for knowledge hub operations.
pub type KnowledgeHubResult<T> = Result<T, KnowledgeHubError>;

/// Reads articles from the knowledge hub table.
#[derive(Clone)]
pub struct KnowledgeHubService {
    db: Arc<dyn TableStore>,
    table: String,
}

impl KnowledgeHubService {
    /// Create a service over `db`.
    #[must_use]
    pub fn new(db: Arc<dyn TableStore>) -> Self {
        Self {
            db,
            table: KNOWLEDGE_HUB_TABLE.to_string(),
        }
    }

    /// List articles, newest publication first.
    ///
    /// # Errors
    /// Returns an error if the store fails or a row does not fit the model.
    pub async fn list(&self, params: &KnowledgeHubQuery) -> KnowledgeHubResult<Vec<KnowledgeHubItem>> {
        let mut filter = Filter::new();
        if let Some(search) = params.search_term() {
            filter = filter.ilike("title", format!("%{search}%"));
        }
        if let Some(life_stage) = params.life_stage() {
            filter = filter.eq("life_stage_id", life_stage);
        }
        if let Some(perspective) = params.perspective() {
            filter = filter.eq("perspective_id", perspective);
        }
        if let Some(featured) = params.is_featured {
            filter = filter.eq("is_featured", featured);
        }

        let query = SelectQuery::new()
            .filter(filter)
            .order(Order::desc("published_at"))
            .limit(params.per_page());
        let rows = self.db.select(&self.table, query).await?;

        rows.into_iter()
            .map(|row| to_item(row, params.language()))
            .collect()
    }

    /// Fetch one article by slug.
    ///
    /// # Errors
    /// Returns an error if the store fails or the row does not fit the model.
    pub async fn get_by_slug(
        &self,
        slug: &str,
        lang: &str,
    ) -> KnowledgeHubResult<Option<KnowledgeHubItem>> {
        let query = SelectQuery::new()
            .filter(Filter::new().eq("slug", slug))
            .limit(1);
        let rows = self.db.select(&self.table, query).await?;

        rows.into_iter()
            .next()
            .map(|row| to_item(row, lang))
            .transpose()
    }
}

fn to_item(row: Value, lang: &str) -> KnowledgeHubResult<KnowledgeHubItem> {
    let row = match row {
        Value::Object(mut object) => {
            localize(&mut object, lang);
            Value::Object(object)
        }
        other => other,
    };
    Ok(serde_json::from_value(row)?)
}
