//! Knowledge hub articles, with Telugu localization.

pub mod service;
pub mod types;

pub use service::{KnowledgeHubError, KnowledgeHubResult, KnowledgeHubService};
pub use types::{KNOWLEDGE_HUB_TABLE, KnowledgeHubItem, KnowledgeHubQuery, localize};
