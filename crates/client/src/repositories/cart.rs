//! Cart and favorites repositories.

use async_trait::async_trait;
use serde_json::json;
use tracing::instrument;

use brewmart_core::{CartItemId, ProductId, UserId};

use super::PRODUCT_JOIN;
use crate::backend::{BackendClient, BackendError, Direction};
use crate::models::{CartItem, CartItemRow, Favorite, FavoriteRow};

/// The signed-in user's cart lines.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// All lines, oldest first.
    async fn cart_items(&self, user: UserId) -> Result<Vec<CartItem>, BackendError>;

    /// Insert a new line.
    async fn add_item(
        &self,
        user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<CartItem, BackendError>;

    /// Set the quantity of an existing line.
    async fn update_quantity(
        &self,
        item: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, BackendError>;

    /// Delete one line.
    async fn remove_item(&self, item: CartItemId) -> Result<(), BackendError>;

    /// Delete every line of the user's cart.
    async fn clear(&self, user: UserId) -> Result<(), BackendError>;
}

/// The signed-in user's favorite products.
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// All favorites, newest first.
    async fn favorites(&self, user: UserId) -> Result<Vec<Favorite>, BackendError>;

    async fn add_favorite(&self, user: UserId, product: ProductId)
    -> Result<Favorite, BackendError>;

    async fn remove_favorite(&self, user: UserId, product: ProductId) -> Result<(), BackendError>;
}

/// [`CartRepository`] and [`FavoritesRepository`] backed by the REST layer.
#[derive(Debug, Clone)]
pub struct RemoteCartRepository {
    backend: BackendClient,
}

impl RemoteCartRepository {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    fn line_columns() -> String {
        format!("id,quantity,{PRODUCT_JOIN}")
    }
}

/// Take the single row a `return=representation` mutation sends back.
fn first_row<T>(rows: Vec<T>, table: &str) -> Result<T, BackendError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| BackendError::NotFound(format!("no row returned from '{table}'")))
}

#[async_trait]
impl CartRepository for RemoteCartRepository {
    #[instrument(skip(self))]
    async fn cart_items(&self, user: UserId) -> Result<Vec<CartItem>, BackendError> {
        let rows: Vec<CartItemRow> = self
            .backend
            .from("cart_items")
            .select(&Self::line_columns())
            .eq("user_id", user)
            .order("id", Direction::Ascending)
            .select_all()
            .await?;
        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    #[instrument(skip(self))]
    async fn add_item(
        &self,
        user: UserId,
        product: ProductId,
        quantity: u32,
    ) -> Result<CartItem, BackendError> {
        let rows: Vec<CartItemRow> = self
            .backend
            .from("cart_items")
            .select(&Self::line_columns())
            .insert(&json!({
                "user_id": user,
                "product_id": product,
                "quantity": quantity,
            }))
            .await?;
        first_row(rows, "cart_items").map(CartItem::from)
    }

    #[instrument(skip(self))]
    async fn update_quantity(
        &self,
        item: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, BackendError> {
        let rows: Vec<CartItemRow> = self
            .backend
            .from("cart_items")
            .select(&Self::line_columns())
            .eq("id", item)
            .update(&json!({ "quantity": quantity }))
            .await?;
        first_row(rows, "cart_items").map(CartItem::from)
    }

    #[instrument(skip(self))]
    async fn remove_item(&self, item: CartItemId) -> Result<(), BackendError> {
        self.backend
            .from("cart_items")
            .eq("id", item)
            .delete()
            .await
    }

    #[instrument(skip(self))]
    async fn clear(&self, user: UserId) -> Result<(), BackendError> {
        self.backend
            .from("cart_items")
            .eq("user_id", user)
            .delete()
            .await
    }
}

#[async_trait]
impl FavoritesRepository for RemoteCartRepository {
    #[instrument(skip(self))]
    async fn favorites(&self, user: UserId) -> Result<Vec<Favorite>, BackendError> {
        let rows: Vec<FavoriteRow> = self
            .backend
            .from("favorites")
            .select(&format!("id,{PRODUCT_JOIN}"))
            .eq("user_id", user)
            .order("id", Direction::Descending)
            .select_all()
            .await?;
        Ok(rows.into_iter().map(Favorite::from).collect())
    }

    #[instrument(skip(self))]
    async fn add_favorite(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Favorite, BackendError> {
        let rows: Vec<FavoriteRow> = self
            .backend
            .from("favorites")
            .select(&format!("id,{PRODUCT_JOIN}"))
            .insert(&json!({ "user_id": user, "product_id": product }))
            .await?;
        first_row(rows, "favorites").map(Favorite::from)
    }

    #[instrument(skip(self))]
    async fn remove_favorite(&self, user: UserId, product: ProductId) -> Result<(), BackendError> {
        self.backend
            .from("favorites")
            .eq("user_id", user)
            .eq("product_id", product)
            .delete()
            .await
    }
}
