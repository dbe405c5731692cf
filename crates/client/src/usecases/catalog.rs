//! Catalog use-cases.

use std::sync::Arc;

use chrono::Utc;
use futures::future::try_join_all;

use brewmart_core::{CategoryId, ProductId};

use super::{failed, sign_path, sign_product, sign_products};
use crate::error::Outcome;
use crate::models::{Category, Product, Promotion};
use crate::repositories::{CatalogRepository, ImageSigner};

/// Browse and search the catalog.
#[derive(Clone)]
pub struct CatalogUseCases {
    catalog: Arc<dyn CatalogRepository>,
    images: Arc<dyn ImageSigner>,
    search_limit: usize,
}

impl CatalogUseCases {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        images: Arc<dyn ImageSigner>,
        search_limit: usize,
    ) -> Self {
        Self {
            catalog,
            images,
            search_limit,
        }
    }

    /// All categories with signed icon URLs.
    ///
    /// # Errors
    ///
    /// Fails if the categories or any icon URL can't be fetched.
    pub async fn get_categories(&self) -> Outcome<Vec<Category>> {
        let categories = self
            .catalog
            .categories()
            .await
            .map_err(failed("get_categories"))?;
        let images = self.images.as_ref();
        try_join_all(categories.into_iter().map(|mut category| async move {
            category.image_url = sign_path(images, category.image_path.as_deref()).await?;
            Ok::<_, crate::backend::BackendError>(category)
        }))
        .await
        .map_err(failed("get_categories"))
    }

    /// Products, optionally in one category, with signed image URLs.
    ///
    /// # Errors
    ///
    /// Fails if the products or any image URL can't be fetched.
    pub async fn get_products(&self, category: Option<CategoryId>) -> Outcome<Vec<Product>> {
        let products = self
            .catalog
            .products(category)
            .await
            .map_err(failed("get_products"))?;
        sign_products(self.images.as_ref(), products)
            .await
            .map_err(failed("get_products"))
    }

    /// One product with its signed image URL.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` for an unknown id.
    pub async fn get_product(&self, id: ProductId) -> Outcome<Product> {
        let product = self
            .catalog
            .product(id)
            .await
            .map_err(failed("get_product"))?;
        sign_product(self.images.as_ref(), product)
            .await
            .map_err(failed("get_product"))
    }

    /// Products whose name contains `query`.
    ///
    /// A blank query yields an empty list without a request.
    ///
    /// # Errors
    ///
    /// Fails if the search request fails.
    pub async fn search_products(&self, query: &str) -> Outcome<Vec<Product>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut products = self
            .catalog
            .search_products(query, self.search_limit)
            .await
            .map_err(failed("search_products"))?;
        products.truncate(self.search_limit);
        sign_products(self.images.as_ref(), products)
            .await
            .map_err(failed("search_products"))
    }

    /// Promotions running right now, with signed banner URLs.
    ///
    /// # Errors
    ///
    /// Fails if the promotions or any banner URL can't be fetched.
    pub async fn get_promotions(&self) -> Outcome<Vec<Promotion>> {
        let now = Utc::now();
        let promotions = self
            .catalog
            .promotions()
            .await
            .map_err(failed("get_promotions"))?;
        let images = self.images.as_ref();
        try_join_all(
            promotions
                .into_iter()
                .filter(|promotion| promotion.is_active_at(now))
                .map(|mut promotion| async move {
                    promotion.image_url =
                        sign_path(images, promotion.image_path.as_deref()).await?;
                    Ok::<_, crate::backend::BackendError>(promotion)
                }),
        )
        .await
        .map_err(failed("get_promotions"))
    }
}
