//! Per-user row cap for the conversation table.
//!
//! After an assistant turn is saved, the trimmer reads every `created_at` for the
//! user and, when there are more than `max_rows_per_user`, deletes rows strictly
//! older than the `max_rows_per_user`-th most recent timestamp. Rows sharing the
//! boundary timestamp are all kept, so a trim can leave slightly more than the cap.
//! Rows whose `created_at` cannot be read are skipped with a warning.
//! Fetch and delete are separate statements; a row inserted in between is not
//! protected.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::conversation::config::RetentionConfig;
use crate::conversation::errors::ConversationResult;
use crate::db::timestamp::{format_timestamp, parse_timestamp};
use crate::db::{Filter, SelectQuery, TableStore};

/// What a trim run did.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimOutcome {
    /// Row count was within the cap; no delete issued.
    WithinLimit {
        /// Rows found for the user.
        rows: usize,
    },
    /// Rows older than `threshold` were deleted.
    Trimmed {
        /// Rows found before the delete.
        rows: usize,
        /// Timestamp of the oldest kept row.
        threshold: DateTime<Utc>,
    },
}

/// Enforces the per-user row cap.
#[derive(Clone)]
pub struct RetentionTrimmer {
    db: Arc<dyn TableStore>,
    table: String,
    max_rows: usize,
}

impl RetentionTrimmer {
    /// Create a trimmer for `table`.
    #[must_use]
    pub fn new(db: Arc<dyn TableStore>, table: impl Into<String>, config: &RetentionConfig) -> Self {
        Self {
            db,
            table: table.into(),
            max_rows: config.max_rows_per_user,
        }
    }

    /// Best-effort trim: failures are logged and swallowed.
    pub async fn enforce(&self, user_id: &str) {
        match self.try_enforce(user_id).await {
            Ok(TrimOutcome::Trimmed { rows, threshold }) => {
                info!(
                    user_id,
                    rows,
                    threshold = %format_timestamp(&threshold),
                    "Trimmed conversation history"
                );
            }
            Ok(TrimOutcome::WithinLimit { rows }) => {
                debug!(user_id, rows, "Conversation history within limit");
            }
            Err(err) => {
                warn!(user_id, %err, "Failed to cleanup old messages");
            }
        }
    }

    /// Run one trim and report the outcome.
    ///
    /// # Errors
    /// Returns an error if the fetch or delete fails.
    pub async fn try_enforce(&self, user_id: &str) -> ConversationResult<TrimOutcome> {
        let query = SelectQuery::new()
            .columns(&["created_at"])
            .filter(Filter::new().eq("user_id", user_id));
        let rows = self.db.select(&self.table, query).await?;

        if rows.len() <= self.max_rows {
            return Ok(TrimOutcome::WithinLimit { rows: rows.len() });
        }

        let mut timestamps: Vec<DateTime<Utc>> = rows
            .iter()
            .filter_map(|row| {
                let timestamp = row_timestamp(row);
                if timestamp.is_none() {
                    warn!(user_id, %row, "Skipping conversation row with unreadable created_at");
                }
                timestamp
            })
            .collect();
        timestamps.sort_unstable_by(|a, b| b.cmp(a));

        // Fewer readable rows than the cap: nothing to anchor the cutoff on.
        let Some(threshold) = self
            .max_rows
            .checked_sub(1)
            .and_then(|idx| timestamps.get(idx).copied())
        else {
            return Ok(TrimOutcome::WithinLimit { rows: rows.len() });
        };

        let filter = Filter::new()
            .eq("user_id", user_id)
            .lt("created_at", format_timestamp(&threshold));
        self.db.delete(&self.table, filter).await?;

        Ok(TrimOutcome::Trimmed {
            rows: rows.len(),
            threshold,
        })
    }
}

fn row_timestamp(row: &Value) -> Option<DateTime<Utc>> {
    row.get("created_at")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
}
