//! Orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use brewmart_core::{OrderId, OrderItemId, OrderStatus, Price, ProductId, UserId};

use super::account::DeliveryDetails;
use super::catalog::{Product, ProductRow};

/// `order_items` row with the embedded product.
///
/// `product` is null when the product has since been removed from the
/// catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemRow {
    pub id: OrderItemId,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub product: Option<ProductRow>,
}

/// `orders` row with embedded items.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(flatten)]
    pub delivery: DeliveryDetails,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItemRow>,
}

/// A line of a placed order, priced at the time of ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product: Option<Product>,
    pub quantity: u32,
    pub unit_price: Price,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            product: row.product.map(Product::from),
            quantity: row.quantity,
            unit_price: Price::uah(row.unit_price),
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub total: Price,
    pub delivery: DeliveryDetails,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            status: row.status,
            total: Price::uah(row.total),
            delivery: row.delivery,
            created_at: row.created_at,
            items: row.items.into_iter().map(OrderItem::from).collect(),
        }
    }
}

/// Insert payload for `orders`.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub total: Decimal,
    #[serde(flatten)]
    pub delivery: DeliveryDetails,
}

/// Insert payload for `order_items`.
#[derive(Debug, Clone, Serialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}
