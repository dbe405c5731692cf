//! Cart and favorites use-cases.

use std::sync::Arc;

use futures::future::try_join_all;

use brewmart_core::{CartItemId, ProductId};

use super::{failed, sign_product, sign_products, signed_in_user};
use crate::backend::BackendError;
use crate::error::{Outcome, UseCaseError};
use crate::models::{CartItem, Favorite, Product};
use crate::repositories::{AuthRepository, CartRepository, FavoritesRepository, ImageSigner};

async fn sign_line(images: &dyn ImageSigner, mut item: CartItem) -> Result<CartItem, BackendError> {
    item.product = sign_product(images, item.product).await?;
    Ok(item)
}

/// The signed-in user's cart.
#[derive(Clone)]
pub struct CartUseCases {
    auth: Arc<dyn AuthRepository>,
    cart: Arc<dyn CartRepository>,
    images: Arc<dyn ImageSigner>,
}

impl CartUseCases {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthRepository>,
        cart: Arc<dyn CartRepository>,
        images: Arc<dyn ImageSigner>,
    ) -> Self {
        Self { auth, cart, images }
    }

    /// All cart lines with signed product images.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthorized` when signed out, or if the request fails.
    pub async fn get_cart(&self) -> Outcome<Vec<CartItem>> {
        let user = signed_in_user(self.auth.as_ref()).await?;
        let items = self
            .cart
            .cart_items(user)
            .await
            .map_err(failed("get_cart"))?;
        let images = self.images.as_ref();
        try_join_all(items.into_iter().map(|item| sign_line(images, item)))
            .await
            .map_err(failed("get_cart"))
    }

    /// Add `quantity` units of a product.
    ///
    /// If the product already has a line, that line's quantity grows instead
    /// of a second line being inserted.
    ///
    /// # Errors
    ///
    /// Fails with `Invalid` for a zero quantity, `Unauthorized` when signed
    /// out, or if a request fails.
    pub async fn add_to_cart(&self, product: ProductId, quantity: u32) -> Outcome<CartItem> {
        if quantity == 0 {
            return Err(UseCaseError::invalid("Quantity must be at least 1"));
        }
        let user = signed_in_user(self.auth.as_ref()).await?;
        let existing = self
            .cart
            .cart_items(user)
            .await
            .map_err(failed("add_to_cart"))?
            .into_iter()
            .find(|item| item.product.id == product);

        let item = match existing {
            Some(line) => {
                self.cart
                    .update_quantity(line.id, line.quantity.saturating_add(quantity))
                    .await
            }
            None => self.cart.add_item(user, product, quantity).await,
        }
        .map_err(failed("add_to_cart"))?;
        tracing::info!(product = %product, quantity = item.quantity, "Cart line saved");
        sign_line(self.images.as_ref(), item)
            .await
            .map_err(failed("add_to_cart"))
    }

    /// Set a line's quantity. Zero removes the line and yields `None`.
    ///
    /// # Errors
    ///
    /// Fails if the request fails.
    pub async fn change_quantity(
        &self,
        item: CartItemId,
        quantity: u32,
    ) -> Outcome<Option<CartItem>> {
        if quantity == 0 {
            self.remove_from_cart(item).await?;
            return Ok(None);
        }
        let line = self
            .cart
            .update_quantity(item, quantity)
            .await
            .map_err(failed("change_quantity"))?;
        sign_line(self.images.as_ref(), line)
            .await
            .map(Some)
            .map_err(failed("change_quantity"))
    }

    /// Delete one line.
    ///
    /// # Errors
    ///
    /// Fails if the request fails.
    pub async fn remove_from_cart(&self, item: CartItemId) -> Outcome<()> {
        self.cart
            .remove_item(item)
            .await
            .map_err(failed("remove_from_cart"))
    }
}

/// The signed-in user's favorites.
#[derive(Clone)]
pub struct FavoritesUseCases {
    auth: Arc<dyn AuthRepository>,
    favorites: Arc<dyn FavoritesRepository>,
    images: Arc<dyn ImageSigner>,
}

impl FavoritesUseCases {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthRepository>,
        favorites: Arc<dyn FavoritesRepository>,
        images: Arc<dyn ImageSigner>,
    ) -> Self {
        Self {
            auth,
            favorites,
            images,
        }
    }

    /// Favorite products with signed images.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthorized` when signed out, or if the request fails.
    pub async fn get_favorites(&self) -> Outcome<Vec<Product>> {
        let user = signed_in_user(self.auth.as_ref()).await?;
        let favorites = self
            .favorites
            .favorites(user)
            .await
            .map_err(failed("get_favorites"))?;
        let products = favorites.into_iter().map(|f: Favorite| f.product).collect();
        sign_products(self.images.as_ref(), products)
            .await
            .map_err(failed("get_favorites"))
    }

    /// Whether `product` is among the user's favorites. `false` when signed
    /// out.
    ///
    /// # Errors
    ///
    /// Fails if the request fails.
    pub async fn is_favorite(&self, product: ProductId) -> Outcome<bool> {
        let Some(user) = self.auth.current_user().await else {
            return Ok(false);
        };
        let favorites = self
            .favorites
            .favorites(user.id)
            .await
            .map_err(failed("is_favorite"))?;
        Ok(favorites.iter().any(|f| f.product.id == product))
    }

    /// Flip the favorite flag of a product given its current value.
    /// Returns the new value.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthorized` when signed out, or if the request fails.
    pub async fn toggle_favorite(&self, product: ProductId, is_favorite: bool) -> Outcome<bool> {
        let user = signed_in_user(self.auth.as_ref()).await?;
        if is_favorite {
            self.favorites
                .remove_favorite(user, product)
                .await
                .map_err(failed("toggle_favorite"))?;
        } else {
            self.favorites
                .add_favorite(user, product)
                .await
                .map_err(failed("toggle_favorite"))?;
        }
        Ok(!is_favorite)
    }
}
