//! Conversation row model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Language tag used when the caller gives none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Who produced a turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// The person using the app.
    User,
    /// The assistant.
    Sakhi,
}

impl MessageType {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Sakhi => "sakhi",
        }
    }

    /// Map a stored `message_type`; anything other than `user` is the assistant.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        if value == Some("user") {
            Self::User
        } else {
            Self::Sakhi
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rich-media references attached to an assistant turn.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MediaLinks {
    /// Recommended video.
    pub youtube_link: Option<String>,
    /// Recommended infographic.
    pub infographic_url: Option<String>,
}

impl MediaLinks {
    /// Build links, dropping empty strings.
    #[must_use]
    pub fn new(youtube_link: Option<&str>, infographic_url: Option<&str>) -> Self {
        Self {
            youtube_link: non_empty(youtube_link),
            infographic_url: non_empty(infographic_url),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One persisted conversation turn.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConversationRow {
    /// Conversation owner.
    pub user_id: String,
    /// Turn text.
    pub message_text: String,
    /// Producer of the turn.
    pub message_type: MessageType,
    /// Locale tag, informational.
    pub language: String,
    /// Client-assigned insertion time; ordering and retention key.
    #[serde(with = "crate::db::timestamp")]
    pub created_at: DateTime<Utc>,
    /// Correlation id, assistant turns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<Uuid>,
    /// Recommended video, assistant turns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube_link: Option<String>,
    /// Recommended infographic, assistant turns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infographic_url: Option<String>,
}

impl ConversationRow {
    /// Build a user turn.
    #[must_use]
    pub fn user(
        user_id: impl Into<String>,
        text: impl Into<String>,
        language: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message_text: text.into(),
            message_type: MessageType::User,
            language: language.into(),
            created_at,
            chat_id: None,
            youtube_link: None,
            infographic_url: None,
        }
    }

    /// Build an assistant turn with a fresh correlation id.
    #[must_use]
    pub fn sakhi(
        user_id: impl Into<String>,
        text: impl Into<String>,
        language: impl Into<String>,
        created_at: DateTime<Utc>,
        links: MediaLinks,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            message_text: text.into(),
            message_type: MessageType::Sakhi,
            language: language.into(),
            created_at,
            chat_id: Some(Uuid::new_v4()),
            youtube_link: links.youtube_link,
            infographic_url: links.infographic_url,
        }
    }
}

/// A history entry handed to prompt builders.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct HistoryTurn {
    /// `user` or `sakhi`.
    pub role: MessageType,
    /// Turn text.
    pub content: String,
}

impl HistoryTurn {
    /// Build a turn.
    #[must_use]
    pub fn new(role: MessageType, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_type_mapping() {
        assert_eq!(MessageType::from_stored(Some("user")), MessageType::User);
        assert_eq!(MessageType::from_stored(Some("assistant")), MessageType::Sakhi);
        assert_eq!(MessageType::from_stored(None), MessageType::Sakhi);
    }

    #[test]
    fn test_media_links_drop_blank_values() {
        let links = MediaLinks::new(Some("  "), Some("https://example.com/a.png"));
        assert_eq!(links.youtube_link, None);
        assert_eq!(links.infographic_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(MediaLinks::new(None, Some("")), MediaLinks::default());
    }

    #[test]
    fn test_user_row_serializes_without_optional_fields() {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let row = ConversationRow::user("u-1", "hi", "te", ts);
        let value = serde_json::to_value(&row).unwrap();

        assert_eq!(
            value,
            json!({
                "user_id": "u-1",
                "message_text": "hi",
                "message_type": "user",
                "language": "te",
                "created_at": "2023-11-14T22:13:20.000000Z",
            })
        );
    }

    #[test]
    fn test_row_reads_database_representation() {
        let row: ConversationRow = serde_json::from_value(json!({
            "id": 12,
            "user_id": "u-1",
            "message_text": "hello",
            "message_type": "sakhi",
            "language": "en",
            "created_at": "2023-11-14T22:13:20.123456+00:00",
            "chat_id": "6f1c7c1e-8d3b-4d8e-9f55-1f0a2b3c4d5e",
            "youtube_link": null,
        }))
        .unwrap();

        assert_eq!(row.message_type, MessageType::Sakhi);
        assert!(row.chat_id.is_some());
        assert_eq!(row.youtube_link, None);
        assert_eq!(row.created_at.timestamp(), 1_700_000_000);
    }
}
