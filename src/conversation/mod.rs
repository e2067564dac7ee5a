//! Conversation history for the Sakhi assistant.
//!
//! - `message_store`: appends user and assistant turns
//! - `retention`: caps stored rows per user after assistant turns
//! - `history`: reads the latest turns in chronological order
//! - `row`: the persisted row and history entry types
//! - `config` / `errors`: settings and error types

pub mod config;
pub mod errors;
pub mod history;
pub mod message_store;
pub mod retention;
pub mod row;

pub use config::{CONVERSATION_TABLE, ConversationConfig, HistoryConfig, RetentionConfig};
pub use errors::{ConversationError, ConversationResult};
pub use history::HistoryReader;
pub use message_store::{Clock, MessageStore};
pub use retention::{RetentionTrimmer, TrimOutcome};
pub use row::{ConversationRow, DEFAULT_LANGUAGE, HistoryTurn, MediaLinks, MessageType};
