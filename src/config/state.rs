// Application state module
// Owns the services every request handler shares

use std::sync::Arc;

use super::types::Config;
use crate::cache::PageCache;
use crate::storage::{self, ObjectStore};
use crate::upload::UploadPipeline;

/// Application state
pub struct AppState {
    pub config: Config,
    pub page_cache: PageCache,
    pub uploader: UploadPipeline,
}

impl AppState {
    /// Create `AppState` with the storage backend selected in the config
    pub fn new(config: &Config) -> Result<Self, String> {
        let store = storage::from_config(&config.storage)?;
        Ok(Self::with_store(config, store))
    }

    /// Create `AppState` around an already constructed backend
    pub fn with_store(config: &Config, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config: config.clone(),
            page_cache: PageCache::new(&config.page.path),
            uploader: UploadPipeline::new(store, config.storage.bucket.clone()),
        }
    }
}
