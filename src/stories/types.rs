//! Success story models and input validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stories::error::{StoryError, StoryResult};

/// Table holding success stories.
pub const STORIES_TABLE: &str = "sakhi_success_stories";

/// How the author wants to be credited.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareType {
    /// Shown with the author's name.
    Named,
    /// Shown without a name.
    Anonymous,
}

/// Moderation state.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    /// Submitted, awaiting review.
    Pending,
    /// Reviewed, not yet public.
    Approved,
    /// Public.
    Published,
}

impl StoryStatus {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Published => "published",
        }
    }
}

fn default_language() -> String {
    crate::conversation::DEFAULT_LANGUAGE.to_string()
}

/// Story fields supplied by the author.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoryCreate {
    /// Named or anonymous.
    pub share_type: ShareType,
    /// Author name, required when named.
    #[serde(default)]
    pub name: Option<String>,
    /// City.
    pub city: String,
    /// How long the journey took.
    pub journey_duration: String,
    /// Challenges faced.
    pub challenges: String,
    /// Emotions felt.
    pub emotions: Vec<String>,
    /// Treatments tried.
    pub treatments: Vec<String>,
    /// Free-text emotion description.
    #[serde(default)]
    pub emotion_description: Option<String>,
    /// Outcome of the journey.
    pub journey_outcome: String,
    /// Anything else.
    #[serde(default)]
    pub more_details: Option<String>,
    /// Message for others.
    #[serde(default)]
    pub hope_message: Option<String>,
    /// Uploaded photo location.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Editorial summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Generated narrative.
    #[serde(default)]
    pub generated_story: Option<String>,
    /// URL slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Life stage label.
    #[serde(default)]
    pub stage: Option<String>,
    /// Language tag.
    #[serde(default = "default_language")]
    pub language: String,
}

impl StoryCreate {
    /// Check required fields.
    ///
    /// # Errors
    /// Returns [`StoryError::Validation`] naming the first offending field.
    pub fn validate(&self) -> StoryResult<()> {
        let required = [
            ("city", self.city.as_str()),
            ("journey_duration", self.journey_duration.as_str()),
            ("challenges", self.challenges.as_str()),
            ("journey_outcome", self.journey_outcome.as_str()),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(StoryError::Validation(format!("{field} must not be empty")));
            }
        }

        if self.emotions.is_empty() {
            return Err(StoryError::Validation(
                "emotions must have at least one entry".to_string(),
            ));
        }
        if self.treatments.is_empty() {
            return Err(StoryError::Validation(
                "treatments must have at least one entry".to_string(),
            ));
        }

        let has_name = self.name.as_deref().is_some_and(|n| !n.is_empty());
        if self.share_type == ShareType::Named && !has_name {
            return Err(StoryError::Validation(
                "name is required when share_type is named".to_string(),
            ));
        }

        Ok(())
    }
}

/// A stored story.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StoryResponse {
    /// Author-supplied fields.
    #[serde(flatten)]
    pub story: StoryCreate,
    /// Primary key.
    pub id: Uuid,
    /// Moderation state.
    pub status: String,
    /// Whether the author consented to publication.
    pub consent: bool,
    /// Creation time as stored.
    pub created_at: String,
}

/// Consent request body.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct StoryConsent {
    /// Story id.
    pub id: Uuid,
}

/// Status update request body.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct StoryUpdateStatus {
    /// New status.
    pub status: StoryStatus,
}
