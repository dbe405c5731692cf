//! Use-case error type with Sentry integration.
//!
//! Every use-case returns [`Outcome<T>`]. Whatever failed underneath (HTTP,
//! decoding, carrier, validation) is folded into a [`UseCaseError`] carrying
//! the failure's message and a coarse [`ErrorKind`] the screens use to pick
//! between the "network unavailable" and the generic error illustration.

use brewmart_core::{EmailError, PhoneError};
use thiserror::Error;

use crate::backend::BackendError;
use crate::shipping::ShippingError;

/// Coarse classification of a failed use-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response from the server (offline, DNS, timeout).
    Network,
    /// No session, or the session was rejected.
    Unauthorized,
    /// The requested row does not exist.
    NotFound,
    /// User input failed validation before any request was made.
    Invalid,
    /// Anything else.
    Generic,
}

/// The error variant of a use-case result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UseCaseError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Result of a use-case: the success value or a [`UseCaseError`].
pub type Outcome<T> = std::result::Result<T, UseCaseError>;

impl UseCaseError {
    /// Create an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Input validation failure.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid, message)
    }

    /// The operation needs a signed-in user.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized, "You need to sign in first")
    }

    /// Whether the screen should show the "network unavailable" state.
    #[must_use]
    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::Network
    }
}

impl From<BackendError> for UseCaseError {
    fn from(err: BackendError) -> Self {
        let kind = match &err {
            e if e.is_network() => ErrorKind::Network,
            BackendError::Unauthorized(_) => ErrorKind::Unauthorized,
            BackendError::NotFound(_) => ErrorKind::NotFound,
            _ => ErrorKind::Generic,
        };
        Self::new(kind, err.to_string())
    }
}

impl From<ShippingError> for UseCaseError {
    fn from(err: ShippingError) -> Self {
        let kind = if err.is_network() {
            ErrorKind::Network
        } else {
            ErrorKind::Generic
        };
        Self::new(kind, err.to_string())
    }
}

impl From<EmailError> for UseCaseError {
    fn from(err: EmailError) -> Self {
        Self::invalid(err.to_string())
    }
}

impl From<PhoneError> for UseCaseError {
    fn from(err: PhoneError) -> Self {
        Self::invalid(err.to_string())
    }
}

/// Build a `map_err` adapter that logs the failure of `operation`.
///
/// Warnings become Sentry events through the tracing layer installed by the
/// binaries.
pub(crate) fn failed<E>(operation: &'static str) -> impl FnOnce(E) -> UseCaseError
where
    E: Into<UseCaseError>,
{
    move |err| {
        let err: UseCaseError = err.into();
        if err.kind != ErrorKind::Invalid {
            tracing::warn!(operation, kind = ?err.kind, error = %err.message, "Use-case failed");
        }
        err
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on sign-out to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a dispatched intent.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user
/// actions leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}
