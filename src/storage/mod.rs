//! Object storage backends
//!
//! Uploads are handed to an [`ObjectStore`], which persists a byte payload
//! under a bucket/key pair. The backend is picked from configuration.

mod fs;
mod gcs;
mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StorageError;

pub use fs::FsStore;
pub use gcs::GcsStore;
pub use memory::{MemoryStore, StoredObject};

/// Content type every upload is stored with
pub const OCTET_STREAM: &str = "application/octet-stream";

/// A backend that stores byte blobs under a bucket/key pair
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` at `bucket/key`, replacing any existing object.
    ///
    /// `data` is borrowed from a buffer the caller scrubs afterwards. Copies
    /// an implementation makes for transport or storage are its own.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), StorageError>;

    /// Short backend name for logs
    fn name(&self) -> &'static str;
}

/// Build the backend selected in the storage configuration
pub fn from_config(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, String> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::Gcs => {
            let token = config
                .access_token
                .clone()
                .or_else(|| std::env::var("GOOGLE_OAUTH_ACCESS_TOKEN").ok())
                .filter(|t| !t.trim().is_empty());
            let store = GcsStore::new(
                &config.endpoint,
                &config.metadata_endpoint,
                token,
                Duration::from_secs(config.request_timeout),
            )
            .map_err(|e| format!("Failed to build storage client: {e}"))?;
            Arc::new(store)
        }
        StorageBackend::Filesystem => Arc::new(FsStore::new(&config.root)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };

    tracing::info!(
        backend = store.name(),
        bucket = %config.bucket,
        "object storage configured"
    );
    Ok(store)
}

/// Reject keys that could escape a bucket when mapped onto a path
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
        return Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("invalid object key: {key:?}"),
        )));
    }
    Ok(())
}
