//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::conversation::{HistoryReader, MessageStore};
use crate::db::{DbResult, PostgrestStore, TableStore};
use crate::knowledge_hub::KnowledgeHubService;
use crate::stories::StoryService;

/// Shared application state.
pub struct AppState {
    /// Conversation writes.
    pub messages: MessageStore,
    /// Conversation reads.
    pub history: HistoryReader,
    /// Knowledge hub reads.
    pub knowledge_hub: KnowledgeHubService,
    /// Success stories.
    pub stories: StoryService,
    /// Token expected from admin callers.
    pub admin_token: String,
}

impl AppState {
    /// Create state backed by the configured REST database.
    ///
    /// # Errors
    /// Returns an error if the database client cannot be created.
    pub fn new(config: &AppConfig) -> DbResult<Arc<Self>> {
        let db: Arc<dyn TableStore> = Arc::new(PostgrestStore::new(&config.database)?);
        Ok(Self::with_store(db, config))
    }

    /// Create state over an existing table store.
    #[must_use]
    pub fn with_store(db: Arc<dyn TableStore>, config: &AppConfig) -> Arc<Self> {
        Arc::new(Self {
            messages: MessageStore::new(Arc::clone(&db), &config.conversation),
            history: HistoryReader::new(Arc::clone(&db), &config.conversation),
            knowledge_hub: KnowledgeHubService::new(Arc::clone(&db)),
            stories: StoryService::new(db, config.upload_base_url.clone()),
            admin_token: config.admin_token.clone(),
        })
    }
}
