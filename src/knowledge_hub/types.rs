//! Knowledge hub article model and list parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Table holding knowledge hub articles.
pub const KNOWLEDGE_HUB_TABLE: &str = "sakhi_knowledge_hub";
/// Default page size for listings.
pub const DEFAULT_PER_PAGE: usize = 100;
/// Language whose `_te` column variants replace the defaults.
pub const TELUGU: &str = "te";

const LOCALIZED_FIELDS: [&str; 3] = ["title", "summary", "content"];

const fn default_read_time() -> i64 {
    5
}

/// A knowledge hub article as returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeHubItem {
    /// Primary key.
    pub id: i64,
    /// URL slug.
    pub slug: String,
    /// Title, localized.
    pub title: String,
    /// Body, localized.
    pub content: String,
    /// Short summary, localized.
    #[serde(default)]
    pub summary: Option<String>,
    /// Life stage category.
    #[serde(default)]
    pub life_stage_id: Option<i64>,
    /// Perspective category.
    #[serde(default)]
    pub perspective_id: Option<i64>,
    /// Author display name.
    #[serde(default)]
    pub author_name: Option<String>,
    /// Estimated reading time.
    #[serde(default = "default_read_time")]
    pub read_time_minutes: i64,
    /// Featured on the home screen.
    #[serde(default)]
    pub is_featured: bool,
    /// Publication time.
    #[serde(default, with = "crate::db::timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    /// Last edit time.
    #[serde(default, with = "crate::db::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Replace title, summary and content with their `_te` variants when asked for
/// Telugu and the variant is present and non-empty.
pub fn localize(row: &mut Map<String, Value>, lang: &str) {
    if lang != TELUGU {
        return;
    }
    for field in LOCALIZED_FIELDS {
        let translated = row
            .get(&format!("{field}_{TELUGU}"))
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        if let Some(translated) = translated {
            row.insert(field.to_string(), Value::String(translated));
        }
    }
}

/// Query parameters accepted by the listing endpoint.
///
/// Several spellings of the category filters are accepted; the first non-empty
/// one wins.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct KnowledgeHubQuery {
    /// Response language.
    pub lang: Option<String>,
    /// Life stage filter.
    pub life_stage_id: Option<i64>,
    /// Perspective filter.
    pub perspective_id: Option<i64>,
    /// Alias for `life_stage_id`.
    pub life_stage: Option<i64>,
    /// Alias for `perspective_id`.
    pub perspective: Option<i64>,
    /// Alias for `life_stage_id`.
    #[serde(rename = "lifeStage")]
    pub life_stage_camel: Option<i64>,
    /// Featured filter.
    pub is_featured: Option<bool>,
    /// Page size.
    #[serde(rename = "perPage")]
    pub per_page: Option<usize>,
    /// Case-insensitive title search.
    pub search: Option<String>,
}

impl KnowledgeHubQuery {
    /// Effective life stage filter.
    #[must_use]
    pub fn life_stage(&self) -> Option<i64> {
        self.life_stage_id
            .or(self.life_stage)
            .or(self.life_stage_camel)
    }

    /// Effective perspective filter.
    #[must_use]
    pub fn perspective(&self) -> Option<i64> {
        self.perspective_id.or(self.perspective)
    }

    /// Effective language.
    #[must_use]
    pub fn language(&self) -> &str {
        self.lang.as_deref().unwrap_or(crate::conversation::DEFAULT_LANGUAGE)
    }

    /// Effective page size.
    #[must_use]
    pub fn per_page(&self) -> usize {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }

    /// Effective search term, ignoring blanks.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_localize_prefers_telugu_when_present() {
        let Value::Object(mut row) = json!({
            "title": "Nutrition", "title_te": "పోషణ",
            "summary": "Eat well", "summary_te": "",
            "content": "Body",
        }) else {
            unreachable!()
        };

        localize(&mut row, "te");

        assert_eq!(row["title"], "పోషణ");
        assert_eq!(row["summary"], "Eat well");
        assert_eq!(row["content"], "Body");
    }

    #[test]
    fn test_localize_ignores_other_languages() {
        let Value::Object(mut row) = json!({"title": "Nutrition", "title_te": "పోషణ"}) else {
            unreachable!()
        };
        localize(&mut row, "en");
        assert_eq!(row["title"], "Nutrition");
    }

    #[test]
    fn test_query_aliases() {
        let query = KnowledgeHubQuery {
            life_stage_camel: Some(3),
            perspective: Some(2),
            ..KnowledgeHubQuery::default()
        };
        assert_eq!(query.life_stage(), Some(3));
        assert_eq!(query.perspective(), Some(2));
        assert_eq!(query.language(), "en");
        assert_eq!(query.per_page(), 100);

        let query = KnowledgeHubQuery {
            life_stage_id: Some(1),
            life_stage: Some(2),
            ..KnowledgeHubQuery::default()
        };
        assert_eq!(query.life_stage(), Some(1));
    }

    #[test]
    fn test_item_defaults() {
        let item: KnowledgeHubItem = serde_json::from_value(json!({
            "id": 1, "slug": "s", "title": "t", "content": "c",
            "published_at": "2025-01-01T00:00:00+00:00",
        }))
        .unwrap();
        assert_eq!(item.read_time_minutes, 5);
        assert!(!item.is_featured);
        assert!(item.published_at.is_some());
        assert!(item.updated_at.is_none());
    }
}
