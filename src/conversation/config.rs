//! Configuration for conversation storage.

use crate::conversation::errors::{ConversationError, ConversationResult};

/// Table holding conversation turns.
pub const CONVERSATION_TABLE: &str = "sakhi_conversations";

/// Top-level conversation settings.
#[derive(Clone, Debug)]
pub struct ConversationConfig {
    /// Table name.
    pub table: String,
    /// Retention cap settings.
    pub retention: RetentionConfig,
    /// History read settings.
    pub history: HistoryConfig,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            table: CONVERSATION_TABLE.to_string(),
            retention: RetentionConfig::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl ConversationConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ConversationResult<()> {
        if self.table.trim().is_empty() {
            return Err(ConversationError::InvalidConfig(
                "table must not be empty".to_string(),
            ));
        }

        if self.retention.max_rows_per_user == 0 {
            return Err(ConversationError::InvalidConfig(
                "retention.max_rows_per_user must be > 0".to_string(),
            ));
        }

        if self.history.fetch_ceiling == 0 {
            return Err(ConversationError::InvalidConfig(
                "history.fetch_ceiling must be > 0".to_string(),
            ));
        }

        if self.history.default_limit == 0 {
            return Err(ConversationError::InvalidConfig(
                "history.default_limit must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Retention settings.
#[derive(Clone, Debug)]
pub struct RetentionConfig {
    /// Rows kept per user after a trim (ties at the boundary may keep more).
    pub max_rows_per_user: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_rows_per_user: 100,
        }
    }
}

/// History read settings.
#[derive(Clone, Debug)]
pub struct HistoryConfig {
    /// Rows fetched per read, independent of the requested limit.
    pub fetch_ceiling: usize,
    /// Turns returned when the caller gives no limit.
    pub default_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            fetch_ceiling: 50,
            default_limit: 5,
        }
    }
}
