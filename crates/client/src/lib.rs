//! Brewmart Client - the storefront application core.
//!
//! Everything a storefront front-end needs short of drawing pixels:
//!
//! - [`backend`] - `PostgREST`, storage and auth over HTTP
//! - [`shipping`] - Carrier city and department lookups
//! - [`repositories`] - One trait per data area, with remote implementations
//! - [`usecases`] - Business operations returning [`error::Outcome`]
//! - [`viewmodels`] - Per-screen state machines driven by intents
//! - [`app`] - Wiring from [`config::ClientConfig`] to ready view-models
//!
//! # Example
//!
//! ```rust,ignore
//! use brewmart_client::{ClientConfig, Storefront};
//! use brewmart_client::viewmodels::{HomeIntent, ViewModel};
//!
//! let storefront = Storefront::new(ClientConfig::from_env()?);
//! let mut home = storefront.home();
//! home.on_intent(HomeIntent::Load);
//! home.idle().await;
//! println!("{} products", home.state().products.len());
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod shipping;
pub mod usecases;
pub mod viewmodels;

#[cfg(test)]
mod testing;

pub use app::Storefront;
pub use config::{ClientConfig, ConfigError};
pub use error::{ErrorKind, Outcome, UseCaseError};
