//! Brewmart Core - Shared domain types.
//!
//! This crate provides the types every Brewmart component agrees on:
//! - `client` - Backend, repositories, use-cases and view-models
//! - `cli` - Headless command-line driver
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O and no HTTP clients - so it
//! can be shared by the client library, the CLI and tests alike.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, phone numbers and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
