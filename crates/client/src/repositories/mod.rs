//! Repositories: one remote request per method.
//!
//! Each trait describes the data a screen needs from one area of the backend;
//! the `Remote*` types implement it over [`BackendClient`] and
//! [`ShippingClient`]. A repository call resolves exactly once with the rows
//! or the failure of that single request. No retries, no caching.
//!
//! [`BackendClient`]: crate::backend::BackendClient
//! [`ShippingClient`]: crate::shipping::ShippingClient

mod account;
mod cart;
mod catalog;
mod orders;
mod shipping;

pub use account::{
    AddressRepository, AuthRepository, NotificationRepository, ProfileRepository,
    RemoteAccountRepository, RemoteAuthRepository,
};
pub use cart::{CartRepository, FavoritesRepository, RemoteCartRepository};
pub use catalog::{CatalogRepository, ImageSigner, RemoteCatalogRepository};
pub use orders::{OrderRepository, RemoteOrderRepository};
pub use shipping::{RemoteShippingRepository, ShippingRepository};

/// Embedded product join used by every table that references `products`.
pub(crate) const PRODUCT_JOIN: &str = "product:products(*)";
