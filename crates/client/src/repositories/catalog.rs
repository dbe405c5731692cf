//! Catalog repository: categories, products, promotions and image signing.

use async_trait::async_trait;
use tracing::instrument;

use brewmart_core::{CategoryId, ProductId};

use crate::backend::{BackendClient, BackendError, Direction, StorageClient};
use crate::models::{Category, CategoryRow, Product, ProductRow, Promotion, PromotionRow};

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All categories, alphabetically.
    async fn categories(&self) -> Result<Vec<Category>, BackendError>;

    /// Products, newest first, optionally restricted to one category.
    async fn products(&self, category: Option<CategoryId>) -> Result<Vec<Product>, BackendError>;

    /// A single product.
    async fn product(&self, id: ProductId) -> Result<Product, BackendError>;

    /// Products whose name contains `query`, capped at `limit` rows.
    async fn search_products(&self, query: &str, limit: usize)
    -> Result<Vec<Product>, BackendError>;

    /// Promotions, most recently started first.
    async fn promotions(&self) -> Result<Vec<Promotion>, BackendError>;
}

/// Turns a storage path into a time-limited download URL.
#[async_trait]
pub trait ImageSigner: Send + Sync {
    async fn signed_url(&self, path: &str) -> Result<String, BackendError>;
}

#[async_trait]
impl ImageSigner for StorageClient {
    async fn signed_url(&self, path: &str) -> Result<String, BackendError> {
        self.create_signed_url(path).await
    }
}

/// [`CatalogRepository`] backed by the REST layer.
#[derive(Debug, Clone)]
pub struct RemoteCatalogRepository {
    backend: BackendClient,
}

impl RemoteCatalogRepository {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl CatalogRepository for RemoteCatalogRepository {
    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        let rows: Vec<CategoryRow> = self
            .backend
            .from("categories")
            .select("*")
            .order("name", Direction::Ascending)
            .select_all()
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self))]
    async fn products(&self, category: Option<CategoryId>) -> Result<Vec<Product>, BackendError> {
        let mut query = self.backend.from("products").select("*");
        if let Some(category) = category {
            query = query.eq("category_id", category);
        }
        let rows: Vec<ProductRow> = query
            .order("created_at", Direction::Descending)
            .select_all()
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<Product, BackendError> {
        let row: ProductRow = self
            .backend
            .from("products")
            .select("*")
            .eq("id", id)
            .single()
            .await?;
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn search_products(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Product>, BackendError> {
        let rows: Vec<ProductRow> = self
            .backend
            .from("products")
            .select("*")
            .ilike("name", query)
            .order("name", Direction::Ascending)
            .limit(limit)
            .select_all()
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn promotions(&self) -> Result<Vec<Promotion>, BackendError> {
        let rows: Vec<PromotionRow> = self
            .backend
            .from("promotions")
            .select("*")
            .order("starts_at", Direction::Descending)
            .select_all()
            .await?;
        Ok(rows.into_iter().map(Promotion::from).collect())
    }
}
