//! Subcommand implementations.
//!
//! Each command drives a use-case or view-model and prints plain text to
//! stdout. Logs go to stderr.

pub mod account;
pub mod catalog;
pub mod shipping;

use brewmart_client::UseCaseError;
use secrecy::SecretString;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// A use-case failed.
    #[error(transparent)]
    UseCase(#[from] UseCaseError),

    /// An account command was run without credentials.
    #[error("Missing credentials: set BREWMART_EMAIL and BREWMART_PASSWORD")]
    MissingCredentials,

    /// A screen finished loading with an error.
    #[error("Could not load {0}")]
    Screen(&'static str),
}

/// Sign-in details for account commands.
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<SecretString>,
}
