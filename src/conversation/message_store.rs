//! Appending conversation turns.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::conversation::config::ConversationConfig;
use crate::conversation::errors::{ConversationError, ConversationResult};
use crate::conversation::retention::RetentionTrimmer;
use crate::conversation::row::{ConversationRow, DEFAULT_LANGUAGE, MediaLinks, MessageType};
use crate::db::TableStore;

/// Wall-clock source for `created_at`.
pub type Clock = fn() -> DateTime<Utc>;

/// Writes conversation turns and keeps each user's history capped.
#[derive(Clone)]
pub struct MessageStore {
    db: Arc<dyn TableStore>,
    table: String,
    trimmer: RetentionTrimmer,
    clock: Clock,
}

impl MessageStore {
    /// Create a store over `db`.
    #[must_use]
    pub fn new(db: Arc<dyn TableStore>, config: &ConversationConfig) -> Self {
        let trimmer = RetentionTrimmer::new(Arc::clone(&db), config.table.clone(), &config.retention);
        Self {
            db,
            table: config.table.clone(),
            trimmer,
            clock: Utc::now,
        }
    }

    /// Replace the clock used to stamp new rows.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Persist one turn and return it as echoed by the store.
    ///
    /// `created_at` is taken when the call starts. Assistant turns get a fresh
    /// `chat_id` and any non-empty links; user turns never carry either. After an
    /// assistant turn is saved the per-user cap is enforced; a failed trim is
    /// logged and does not fail the append.
    ///
    /// The echoed row is returned when it decodes; otherwise the row as written.
    ///
    /// # Errors
    /// Returns an error if `user_id` is empty or the insert fails.
    pub async fn append(
        &self,
        user_id: &str,
        text: &str,
        language: Option<&str>,
        role: MessageType,
        links: Option<MediaLinks>,
    ) -> ConversationResult<ConversationRow> {
        let created_at = (self.clock)();

        if user_id.trim().is_empty() {
            return Err(ConversationError::InvalidInput(
                "user_id must not be empty".to_string(),
            ));
        }
        let language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LANGUAGE);

        let row = match role {
            MessageType::User => ConversationRow::user(user_id, text, language, created_at),
            MessageType::Sakhi => ConversationRow::sakhi(
                user_id,
                text,
                language,
                created_at,
                links.unwrap_or_default(),
            ),
        };

        let echoed = self.db.insert(&self.table, serde_json::to_value(&row)?).await?;
        debug!(user_id, role = %role, "Saved conversation message");

        if role == MessageType::Sakhi {
            self.trimmer.enforce(user_id).await;
        }

        match serde_json::from_value(echoed) {
            Ok(stored) => Ok(stored),
            Err(err) => {
                warn!(user_id, %err, "Could not decode stored conversation row, returning the written one");
                Ok(row)
            }
        }
    }

    /// Save a user turn.
    ///
    /// # Errors
    /// See [`MessageStore::append`].
    pub async fn save_user_message(
        &self,
        user_id: &str,
        text: &str,
        language: Option<&str>,
    ) -> ConversationResult<ConversationRow> {
        self.append(user_id, text, language, MessageType::User, None)
            .await
    }

    /// Save an assistant turn with optional media links.
    ///
    /// # Errors
    /// See [`MessageStore::append`].
    pub async fn save_sakhi_message(
        &self,
        user_id: &str,
        text: &str,
        language: Option<&str>,
        youtube_link: Option<&str>,
        infographic_url: Option<&str>,
    ) -> ConversationResult<ConversationRow> {
        let links = MediaLinks::new(youtube_link, infographic_url);
        self.append(user_id, text, language, MessageType::Sakhi, Some(links))
            .await
    }

    /// Save a turn whose role comes from the caller.
    ///
    /// # Errors
    /// See [`MessageStore::append`].
    pub async fn save_conversation(
        &self,
        user_id: &str,
        message: &str,
        message_type: MessageType,
        language: &str,
    ) -> ConversationResult<ConversationRow> {
        self.append(user_id, message, Some(language), message_type, None)
            .await
    }
}
