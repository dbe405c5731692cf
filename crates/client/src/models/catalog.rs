//! Catalog entities: categories, products and promotions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use brewmart_core::{CategoryId, Price, ProductId, PromotionId};

const fn default_true() -> bool {
    true
}

// =============================================================================
// Category
// =============================================================================

/// `categories` row.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image_path: Option<String>,
}

/// A product category (coffee beans, tea, accessories...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Storage path of the category icon.
    pub image_path: Option<String>,
    /// Signed URL for `image_path`, once resolved.
    pub image_url: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image_path: row.image_path.filter(|p| !p.is_empty()),
            image_url: None,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// `products` row.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Pack size, e.g. "250 g" or "20 sachets".
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Storage path of the product photo.
    pub image_path: Option<String>,
    /// Signed URL for `image_path`, once resolved.
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub volume: Option<String>,
    pub is_available: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description.unwrap_or_default(),
            price: Price::uah(row.price),
            image_path: row.image_path.filter(|p| !p.is_empty()),
            image_url: None,
            category_id: row.category_id,
            volume: row.volume.filter(|v| !v.is_empty()),
            is_available: row.is_available,
            created_at: row.created_at,
        }
    }
}

impl Product {
    /// Copy of this product with its signed image URL attached.
    #[must_use]
    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

// =============================================================================
// Promotion
// =============================================================================

/// `promotions` row.
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionRow {
    pub id: PromotionId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
    #[serde(default)]
    pub discount_percent: Option<u8>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

/// A banner promotion shown on the home screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Promotion {
    pub id: PromotionId,
    pub title: String,
    pub description: String,
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub discount_percent: Option<u8>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl From<PromotionRow> for Promotion {
    fn from(row: PromotionRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            image_path: row.image_path.filter(|p| !p.is_empty()),
            image_url: None,
            discount_percent: row.discount_percent,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
        }
    }
}

impl Promotion {
    /// Whether `now` falls inside the promotion window. Open ends are unbounded.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.starts_at.is_none_or(|start| start <= now) && self.ends_at.is_none_or(|end| now < end)
    }
}
