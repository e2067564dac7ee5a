//! Reading recent conversation turns for prompt context.

use std::sync::Arc;

use serde_json::Value;

use crate::conversation::config::ConversationConfig;
use crate::conversation::errors::ConversationResult;
use crate::conversation::row::{HistoryTurn, MessageType};
use crate::db::timestamp::parse_timestamp;
use crate::db::{Filter, Order, SelectQuery, TableStore};

const HISTORY_COLUMNS: [&str; 5] = [
    "user_id",
    "message_text",
    "message_type",
    "language",
    "created_at",
];

/// Reads the most recent turns of a user's conversation.
#[derive(Clone)]
pub struct HistoryReader {
    db: Arc<dyn TableStore>,
    table: String,
    fetch_ceiling: usize,
    default_limit: usize,
}

impl HistoryReader {
    /// Create a reader over `db`.
    #[must_use]
    pub fn new(db: Arc<dyn TableStore>, config: &ConversationConfig) -> Self {
        Self {
            db,
            table: config.table.clone(),
            fetch_ceiling: config.history.fetch_ceiling,
            default_limit: config.history.default_limit,
        }
    }

    /// Last `limit` turns, oldest first.
    ///
    /// At most `fetch_ceiling` rows are read regardless of `limit`. Rows without a
    /// readable `created_at` sort as the oldest.
    ///
    /// # Errors
    /// Returns an error if the store cannot be queried.
    pub async fn fetch(&self, user_id: &str, limit: usize) -> ConversationResult<Vec<HistoryTurn>> {
        let query = SelectQuery::new()
            .columns(&HISTORY_COLUMNS)
            .filter(Filter::new().eq("user_id", user_id))
            .order(Order::desc("created_at"))
            .limit(self.fetch_ceiling);
        let mut rows = self.db.select(&self.table, query).await?;

        rows.sort_by(|a, b| row_created_at(b).cmp(&row_created_at(a)));
        rows.truncate(limit);

        Ok(rows.iter().rev().map(to_turn).collect())
    }

    /// Last `history.default_limit` turns, oldest first.
    ///
    /// # Errors
    /// Returns an error if the store cannot be queried.
    pub async fn fetch_default(&self, user_id: &str) -> ConversationResult<Vec<HistoryTurn>> {
        self.fetch(user_id, self.default_limit).await
    }
}

fn row_created_at(row: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
    row.get("created_at")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}

fn to_turn(row: &Value) -> HistoryTurn {
    let role = MessageType::from_stored(row.get("message_type").and_then(Value::as_str));
    let content = row
        .get("message_text")
        .and_then(Value::as_str)
        .unwrap_or_default();
    HistoryTurn::new(role, content)
}
