//! Auth provider endpoints (`/auth/v1`).
//!
//! Successful sign-in and OTP verification store the returned [`Session`] on
//! the shared [`BackendClient`], so REST calls made afterwards run as the
//! signed-in user.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use brewmart_core::{Email, UserId};

use super::{BackendClient, BackendError};

/// An authenticated session.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone, Deserialize)]
pub struct Session {
    /// Bearer token for REST and storage calls.
    pub access_token: String,
    /// Token used to obtain a new access token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    /// The signed-in user.
    pub user: AuthUser,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

/// User record held by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Free-form metadata supplied at sign-up (first/last name).
    #[serde(default)]
    pub user_metadata: Value,
}

/// Result of a sign-up request.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// Email confirmation is disabled; the user is signed in.
    SignedIn(Session),
    /// A one-time code was emailed; call [`AuthClient::verify_otp`].
    ConfirmationRequired(AuthUser),
}

/// Which flow a one-time code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpKind {
    /// Code sent after sign-up.
    Signup,
    /// Code sent for passwordless sign-in or email change.
    Email,
}

/// Fields of the auth user that can be changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl UserAttributes {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none() && self.password.is_none() && self.data.is_none()
    }
}

/// Client for the auth endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    backend: BackendClient,
}

impl AuthClient {
    /// Create an auth client sharing the backend's session.
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Session, BackendError> {
        let mut url = self.backend.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let request = self
            .backend
            .request(Method::POST, url)
            .await
            .json(&json!({ "email": email.as_str(), "password": password }));

        let session: Session = self
            .backend
            .send_json(request)
            .await
            .map_err(credentials_error)?;
        self.backend.set_session(session.clone()).await;
        Ok(session)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is taken, the password is rejected or the
    /// request fails.
    #[instrument(skip(self, password, metadata), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        metadata: Value,
    ) -> Result<SignUpOutcome, BackendError> {
        let url = self.backend.endpoint("auth/v1/signup")?;
        let request = self.backend.request(Method::POST, url).await.json(&json!({
            "email": email.as_str(),
            "password": password,
            "data": metadata,
        }));

        let body: Value = self.backend.send_json(request).await?;
        if body.get("access_token").is_some() {
            let session: Session = serde_json::from_value(body)?;
            self.backend.set_session(session.clone()).await;
            return Ok(SignUpOutcome::SignedIn(session));
        }

        // Without auto-confirm the provider returns the bare user
        let user: AuthUser = match body.get("user") {
            Some(user) => serde_json::from_value(user.clone())?,
            None => serde_json::from_value(body)?,
        };
        Ok(SignUpOutcome::ConfirmationRequired(user))
    }

    /// Exchange a one-time code for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or expired.
    #[instrument(skip(self, token), fields(email = %email, kind = ?kind))]
    pub async fn verify_otp(
        &self,
        email: &Email,
        token: &str,
        kind: OtpKind,
    ) -> Result<Session, BackendError> {
        let url = self.backend.endpoint("auth/v1/verify")?;
        let request = self.backend.request(Method::POST, url).await.json(&json!({
            "type": kind,
            "email": email.as_str(),
            "token": token.trim(),
        }));

        let session: Session = self
            .backend
            .send_json(request)
            .await
            .map_err(credentials_error)?;
        self.backend.set_session(session.clone()).await;
        Ok(session)
    }

    /// Send the sign-up code again.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (including rate limiting).
    #[instrument(skip(self), fields(email = %email))]
    pub async fn resend_otp(&self, email: &Email) -> Result<(), BackendError> {
        let url = self.backend.endpoint("auth/v1/resend")?;
        let request = self
            .backend
            .request(Method::POST, url)
            .await
            .json(&json!({ "type": OtpKind::Signup, "email": email.as_str() }));
        self.backend.send(request).await.map(|_| ())
    }

    /// Update fields of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` when no user is signed in.
    #[instrument(skip(self, attributes))]
    pub async fn update_user(&self, attributes: &UserAttributes) -> Result<AuthUser, BackendError> {
        let mut session = self.require_session().await?;

        let url = self.backend.endpoint("auth/v1/user")?;
        let request = self
            .backend
            .request(Method::PUT, url)
            .await
            .json(attributes);
        let user: AuthUser = self.backend.send_json(request).await?;

        session.user = user.clone();
        self.backend.set_session(session).await;
        Ok(user)
    }

    /// Sign out.
    ///
    /// The local session is dropped even if the server call fails.
    ///
    /// # Errors
    ///
    /// Returns the server error after the session has been cleared.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), BackendError> {
        if self.backend.session().await.is_none() {
            return Ok(());
        }

        let result = async {
            let url = self.backend.endpoint("auth/v1/logout")?;
            let request = self.backend.request(Method::POST, url).await;
            self.backend.send(request).await.map(|_| ())
        }
        .await;

        self.backend.clear_session().await;
        result
    }

    /// The signed-in user, if any.
    pub async fn current_user(&self) -> Option<AuthUser> {
        self.backend.session().await.map(|s| s.user)
    }

    async fn require_session(&self) -> Result<Session, BackendError> {
        self.backend
            .session()
            .await
            .ok_or_else(|| BackendError::Unauthorized("not signed in".to_string()))
    }
}

/// The token endpoint reports bad credentials as 400 `invalid_grant`.
fn credentials_error(err: BackendError) -> BackendError {
    match err {
        BackendError::Api {
            status: 400,
            message,
        } => BackendError::Unauthorized(message),
        other => other,
    }
}
