//! Google Cloud Storage backend
//!
//! Uses the JSON API simple media upload:
//! `POST {endpoint}/upload/storage/v1/b/{bucket}/o?uploadType=media&name={key}`.
//! Credentials are a bearer token, either configured up front or fetched from
//! the compute metadata server and cached until shortly before they expire.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use hyper::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{validate_key, ObjectStore};
use crate::error::StorageError;

const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh this long before the reported expiry
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Backend error bodies are truncated to this length
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug)]
enum TokenSource {
    Static(String),
    Metadata {
        endpoint: String,
        cached: Mutex<Option<CachedToken>>,
    },
}

/// Cloud Storage client for a single endpoint
#[derive(Debug)]
pub struct GcsStore {
    client: reqwest::Client,
    endpoint: String,
    token: TokenSource,
}

impl GcsStore {
    /// Build a client. With `access_token` unset, tokens come from the
    /// metadata server at `metadata_endpoint`.
    pub fn new(
        endpoint: &str,
        metadata_endpoint: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let token = match access_token {
            Some(token) => TokenSource::Static(token),
            None => TokenSource::Metadata {
                endpoint: metadata_endpoint.trim_end_matches('/').to_string(),
                cached: Mutex::new(None),
            },
        };

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn access_token(&self) -> Result<String, StorageError> {
        match &self.token {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Metadata { endpoint, cached } => {
                let mut cached = cached.lock().await;
                if let Some(token) = cached.as_ref() {
                    if Instant::now() < token.expires_at {
                        return Ok(token.value.clone());
                    }
                }

                let fresh = self.fetch_metadata_token(endpoint).await?;
                let value = fresh.value.clone();
                *cached = Some(fresh);
                Ok(value)
            }
        }
    }

    async fn fetch_metadata_token(&self, endpoint: &str) -> Result<CachedToken, StorageError> {
        let response = self
            .client
            .get(format!("{endpoint}{TOKEN_PATH}"))
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| StorageError::Auth(format!("metadata server unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(StorageError::Auth(format!(
                "metadata server returned {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StorageError::Auth(format!("invalid token response: {e}")))?;

        tracing::debug!(expires_in = token.expires_in, "fetched storage access token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), StorageError> {
        validate_key(key)?;
        let token = self.access_token().await?;
        let url = format!("{}/upload/storage/v1/b/{bucket}/o", self.endpoint);

        let response = self
            .client
            .post(url)
            .query(&[("uploadType", "media"), ("name", key)])
            .bearer_auth(token)
            .header(CONTENT_TYPE, content_type)
            // reqwest owns its request body; this copy is released, not zeroed
            .body(Bytes::copy_from_slice(data))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "gcs"
    }
}
