//! Success stories shared by users, with admin moderation.

pub mod error;
pub mod service;
pub mod types;

pub use error::{StoryError, StoryResult};
pub use service::StoryService;
pub use types::{
    STORIES_TABLE, ShareType, StoryConsent, StoryCreate, StoryResponse, StoryStatus,
    StoryUpdateStatus,
};
