//! Cart lines and favorites.
//!
//! Both tables embed the referenced product through a server-side join
//! (`select=id,quantity,product:products(*)`).

use serde::{Deserialize, Serialize};

use brewmart_core::{CartItemId, FavoriteId, Price};

use super::catalog::{Product, ProductRow};

/// `cart_items` row with the embedded product.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItemRow {
    pub id: CartItemId,
    pub quantity: u32,
    pub product: ProductRow,
}

/// One line of the user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: Product,
    pub quantity: u32,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            product: row.product.into(),
            quantity: row.quantity,
        }
    }
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// Sum of all line totals.
#[must_use]
pub fn cart_subtotal(items: &[CartItem]) -> Price {
    items.iter().map(CartItem::line_total).sum()
}

/// Total number of units across all lines.
#[must_use]
pub fn cart_item_count(items: &[CartItem]) -> u32 {
    items.iter().map(|item| item.quantity).sum()
}

/// `favorites` row with the embedded product.
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteRow {
    pub id: FavoriteId,
    pub product: ProductRow,
}

/// A product the user marked as favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Favorite {
    pub id: FavoriteId,
    pub product: Product,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Self {
            id: row.id,
            product: row.product.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;

    fn rows() -> Vec<CartItemRow> {
        serde_json::from_value(json!([
            {
                "id": 1,
                "quantity": 2,
                "product": { "id": 10, "name": "Espresso blend", "price": "320.00" }
            },
            {
                "id": 2,
                "quantity": 1,
                "product": { "id": 11, "name": "Matcha", "price": 455.5 }
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_cart_totals() {
        let items: Vec<CartItem> = rows().into_iter().map(CartItem::from).collect();
        assert_eq!(items[0].line_total().amount, Decimal::new(64000, 2));
        assert_eq!(cart_subtotal(&items).amount, Decimal::new(10955, 1));
        assert_eq!(cart_item_count(&items), 3);
    }

    #[test]
    fn test_empty_cart_totals() {
        assert_eq!(cart_subtotal(&[]).amount, Decimal::ZERO);
        assert_eq!(cart_item_count(&[]), 0);
    }
}
