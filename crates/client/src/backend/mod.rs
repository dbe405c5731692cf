//! Backend-as-a-service client.
//!
//! # Architecture
//!
//! - One `reqwest::Client` shared by the REST, storage and auth endpoints
//! - The backend is the source of truth - no local persistence
//! - Signed image URLs are memoised via `moka` (see [`storage`])
//!
//! # Endpoints
//!
//! ## REST (`/rest/v1`)
//! - Table select/insert/update/delete with filter, order, limit and
//!   embedded-join clauses, built with [`Query`]
//!
//! ## Storage (`/storage/v1`)
//! - Signed download URLs with a fixed expiry
//!
//! ## Auth (`/auth/v1`)
//! - Password sign-in/up, OTP verification, user updates, sign-out
//!
//! # Example
//!
//! ```rust,ignore
//! use brewmart_client::backend::{BackendClient, Direction};
//!
//! let client = BackendClient::new(&config.backend);
//!
//! let rows: Vec<ProductRow> = client
//!     .from("products")
//!     .select("*")
//!     .eq("category_id", 3)
//!     .order("created_at", Direction::Descending)
//!     .limit(20)
//!     .select_all()
//!     .await?;
//! ```

pub mod auth;
mod postgrest;
pub mod storage;

pub use auth::{AuthClient, AuthUser, OtpKind, Session, SignUpOutcome, UserAttributes};
pub use postgrest::{Direction, Query};
pub use storage::StorageClient;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

use crate::config::BackendConfig;

/// Maximum number of body characters kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or rejected credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Requested row or object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Update or delete issued without any filter.
    #[error("Refusing to {0} every row of '{1}' without a filter")]
    UnfilteredMutation(&'static str, String),
}

impl BackendError {
    /// Whether the failure happened below HTTP (no response was received).
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect() || e.is_timeout() || e.is_request())
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Shared handle to the backend.
///
/// Cheaply cloneable; every clone sees the same auth session.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    http: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
    session: RwLock<Option<Session>>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                http: reqwest::Client::new(),
                base_url: config.url.as_str().trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
                session: RwLock::new(None),
            }),
        }
    }

    /// Start a REST query against `table`.
    #[must_use]
    pub fn from(&self, table: &str) -> Query<'_> {
        Query::new(self, table)
    }

    /// Current auth session, if signed in.
    pub async fn session(&self) -> Option<Session> {
        self.inner.session.read().await.clone()
    }

    /// Replace the current auth session.
    pub async fn set_session(&self, session: Session) {
        *self.inner.session.write().await = Some(session);
    }

    /// Drop the current auth session.
    pub async fn clear_session(&self) {
        *self.inner.session.write().await = None;
    }

    /// Build an absolute URL for a path below the project URL.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.inner.base_url,
            path.trim_start_matches('/')
        ))?)
    }

    /// Absolute project URL without trailing slash.
    pub(crate) fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Start a request carrying the API key and bearer token.
    ///
    /// The bearer is the user's access token when signed in, otherwise the
    /// anon key.
    pub(crate) async fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let anon_key = self.inner.anon_key.expose_secret();
        let bearer = self
            .inner
            .session
            .read()
            .await
            .as_ref()
            .map_or_else(|| anon_key.to_string(), |s| s.access_token.clone());

        self.inner
            .http
            .request(method, url)
            .header("apikey", anon_key)
            .bearer_auth(bearer)
    }

    /// Send a request and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body, 500),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    /// Send a request and return the raw body of a success response.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = error_message(&body);
        tracing::debug!(status = %status, message = %message, "Backend returned non-success status");

        Err(match status {
            StatusCode::UNAUTHORIZED => BackendError::Unauthorized(message),
            StatusCode::NOT_FOUND => BackendError::NotFound(message),
            _ => BackendError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }
}

/// Pull a human-readable message out of an error body.
///
/// REST errors use `message`, auth errors use `msg` or `error_description`.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(String::from))
        });

    from_json.unwrap_or_else(|| {
        if body.trim().is_empty() {
            "(empty response body)".to_string()
        } else {
            truncate(body, ERROR_BODY_LIMIT)
        }
    })
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
