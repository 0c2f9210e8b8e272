//! Upload pipeline
//!
//! Takes a fully buffered request body, names it after the minute it finished
//! arriving and hands it to the configured object store. The buffer is
//! scrubbed before [`UploadPipeline::upload`] returns, whatever the outcome.
//! Copies a backend makes of the payload (request bodies, map entries) are
//! outside that guarantee.

mod buffer;
mod key;

use std::sync::Arc;

pub use buffer::UploadBuffer;
pub use key::StorageKey;

use crate::error::UploadError;
use crate::storage::{ObjectStore, OCTET_STREAM};

/// Forwards upload buffers to an object store bucket
pub struct UploadPipeline {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl UploadPipeline {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: String) -> Self {
        Self { store, bucket }
    }

    /// Store the buffer and return its key. The buffer is empty afterwards.
    pub async fn upload(&self, buffer: &mut UploadBuffer) -> Result<StorageKey, UploadError> {
        let result = self.store_buffer(buffer).await;
        buffer.scrub();
        result
    }

    async fn store_buffer(&self, buffer: &UploadBuffer) -> Result<StorageKey, UploadError> {
        if buffer.is_empty() {
            return Err(UploadError::EmptyBody);
        }

        let key = StorageKey::from_time(buffer.created_at());
        tracing::info!(
            bytes = buffer.len(),
            bucket = %self.bucket,
            key = %key,
            backend = self.store.name(),
            "uploading object"
        );

        match self
            .store
            .put_object(&self.bucket, key.as_str(), OCTET_STREAM, buffer.as_bytes())
            .await
        {
            Ok(()) => {
                tracing::info!(bucket = %self.bucket, key = %key, "upload stored");
                Ok(key)
            }
            Err(e) => {
                tracing::error!(
                    bucket = %self.bucket,
                    key = %key,
                    error = %e,
                    "upload to object storage failed"
                );
                Err(e.into())
            }
        }
    }
}
