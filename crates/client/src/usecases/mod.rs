//! Use-cases: thin adapters between view-models and repositories.
//!
//! Each method runs one repository call (occasionally a short fixed sequence
//! of them, as in placing an order), attaches signed image URLs where the
//! screen needs them, and folds any failure into a [`UseCaseError`] via
//! [`failed`]. Use-cases that act on the signed-in user's data resolve the
//! user from the current session and fail with [`ErrorKind::Unauthorized`]
//! when there is none, without making a request.
//!
//! [`UseCaseError`]: crate::error::UseCaseError
//! [`ErrorKind::Unauthorized`]: crate::error::ErrorKind::Unauthorized

mod account;
mod cart;
mod catalog;
mod orders;
mod shipping;

use futures::future::try_join_all;

use brewmart_core::UserId;

use crate::backend::BackendError;
use crate::error::{Outcome, UseCaseError};
use crate::models::Product;
use crate::repositories::{AuthRepository, ImageSigner};

pub use account::{AuthUseCases, NotificationUseCases, ProfileForm, ProfileUseCases};
pub use cart::{CartUseCases, FavoritesUseCases};
pub use catalog::CatalogUseCases;
pub use orders::OrderUseCases;
pub use shipping::ShippingUseCases;

pub(crate) use crate::error::failed;

/// The signed-in user's id, or `Unauthorized`.
pub(crate) async fn signed_in_user(auth: &dyn AuthRepository) -> Outcome<UserId> {
    auth.current_user()
        .await
        .map(|user| user.id)
        .ok_or_else(UseCaseError::unauthorized)
}

/// Sign an optional storage path.
pub(crate) async fn sign_path(
    images: &dyn ImageSigner,
    path: Option<&str>,
) -> Result<Option<String>, BackendError> {
    match path {
        Some(path) => images.signed_url(path).await.map(Some),
        None => Ok(None),
    }
}

/// Attach a signed image URL to each product, signing concurrently.
pub(crate) async fn sign_products(
    images: &dyn ImageSigner,
    products: Vec<Product>,
) -> Result<Vec<Product>, BackendError> {
    try_join_all(products.into_iter().map(|product| sign_product(images, product))).await
}

pub(crate) async fn sign_product(
    images: &dyn ImageSigner,
    product: Product,
) -> Result<Product, BackendError> {
    let url = sign_path(images, product.image_path.as_deref()).await?;
    Ok(product.with_image_url(url))
}
