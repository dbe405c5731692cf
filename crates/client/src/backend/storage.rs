//! Object storage: signed download URLs.
//!
//! Signed URLs are cached with a TTL slightly shorter than their expiry so a
//! cached URL is always still valid when handed out.

use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use super::{BackendClient, BackendError};

/// How long before expiry a cached URL is evicted.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct SignedUrlResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

/// Client for one storage bucket.
#[derive(Clone)]
pub struct StorageClient {
    backend: BackendClient,
    bucket: String,
    expiry: Duration,
    cache: Cache<String, String>,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("bucket", &self.bucket)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    /// Create a client for `bucket` issuing URLs valid for `expiry`.
    #[must_use]
    pub fn new(backend: BackendClient, bucket: &str, expiry: Duration) -> Self {
        let ttl = expiry
            .checked_sub(EXPIRY_MARGIN)
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(1));

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self {
            backend,
            bucket: bucket.to_string(),
            expiry,
            cache,
        }
    }

    /// Bucket this client signs objects from.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Create a time-limited download URL for an object.
    ///
    /// Paths that already are absolute `http(s)` URLs are returned as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or the request fails.
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn create_signed_url(&self, path: &str) -> Result<String, BackendError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.to_string());
        }

        let path = path.trim_start_matches('/');
        if let Some(url) = self.cache.get(path).await {
            debug!("Cache hit for signed URL");
            return Ok(url);
        }

        let endpoint = self
            .backend
            .endpoint(&format!("storage/v1/object/sign/{}/{path}", self.bucket))?;
        let request = self
            .backend
            .request(Method::POST, endpoint)
            .await
            .json(&json!({ "expiresIn": self.expiry.as_secs() }));

        let response: SignedUrlResponse = self.backend.send_json(request).await?;
        let url = absolute_signed_url(self.backend.base_url(), &response.signed_url);

        self.cache.insert(path.to_string(), url.clone()).await;
        Ok(url)
    }
}

/// The storage API answers with a path relative to `/storage/v1`.
fn absolute_signed_url(base_url: &str, signed: &str) -> String {
    if signed.starts_with("http://") || signed.starts_with("https://") {
        return signed.to_string();
    }
    format!(
        "{}/storage/v1/{}",
        base_url.trim_end_matches('/'),
        signed.trim_start_matches('/')
    )
}
