//! Order use-cases.

use std::sync::Arc;

use brewmart_core::{OrderId, OrderStatus, PhoneNumber};

use super::{failed, signed_in_user};
use crate::error::{Outcome, UseCaseError, add_breadcrumb};
use crate::models::{DeliveryDetails, NewOrder, NewOrderItem, Order, cart_subtotal};
use crate::repositories::{AuthRepository, CartRepository, OrderRepository};

/// Order history and checkout.
#[derive(Clone)]
pub struct OrderUseCases {
    auth: Arc<dyn AuthRepository>,
    cart: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderUseCases {
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthRepository>,
        cart: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self { auth, cart, orders }
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Fails with `Unauthorized` when signed out, or if the request fails.
    pub async fn get_orders(&self) -> Outcome<Vec<Order>> {
        let user = signed_in_user(self.auth.as_ref()).await?;
        self.orders.orders(user).await.map_err(failed("get_orders"))
    }

    /// One order with its items.
    ///
    /// # Errors
    ///
    /// Fails with `NotFound` for an unknown id.
    pub async fn get_order(&self, id: OrderId) -> Outcome<Order> {
        self.orders.order(id).await.map_err(failed("get_order"))
    }

    /// Turn the current cart into an order delivered to `delivery`.
    ///
    /// Validates the delivery details, then creates the order, inserts one
    /// item per cart line priced at the current catalog price, and empties
    /// the cart.
    ///
    /// # Errors
    ///
    /// Fails with `Invalid` when the cart is empty or the delivery details
    /// are incomplete, `Unauthorized` when signed out, or if a request fails.
    pub async fn place_order(&self, delivery: &DeliveryDetails) -> Outcome<Order> {
        let delivery = validate_delivery(delivery)?;
        let user = signed_in_user(self.auth.as_ref()).await?;

        let lines = self
            .cart
            .cart_items(user)
            .await
            .map_err(failed("place_order"))?;
        if lines.is_empty() {
            return Err(UseCaseError::invalid("Your cart is empty"));
        }

        let new_order = NewOrder {
            user_id: user,
            status: OrderStatus::Pending,
            total: cart_subtotal(&lines).amount,
            delivery,
        };
        let mut order = self
            .orders
            .create_order(&new_order)
            .await
            .map_err(failed("place_order"))?;

        let items: Vec<NewOrderItem> = lines
            .iter()
            .map(|line| NewOrderItem {
                order_id: order.id,
                product_id: line.product.id,
                quantity: line.quantity,
                unit_price: line.product.price.amount,
            })
            .collect();
        self.orders
            .add_order_items(&items)
            .await
            .map_err(failed("place_order"))?;
        self.cart.clear(user).await.map_err(failed("place_order"))?;

        tracing::info!(order = %order.id, total = %order.total, lines = items.len(), "Order placed");
        add_breadcrumb("order", &format!("placed order {}", order.id));

        // Re-read so the caller sees the stored items; fall back to the header
        if let Ok(stored) = self.orders.order(order.id).await {
            order = stored;
        }
        Ok(order)
    }
}

/// Trim the recipient, normalise the phone and require a city and department.
pub(super) fn validate_delivery(delivery: &DeliveryDetails) -> Outcome<DeliveryDetails> {
    let recipient_name = delivery.recipient_name.trim();
    if recipient_name.is_empty() {
        return Err(UseCaseError::invalid("Enter the recipient's name"));
    }
    let phone = PhoneNumber::parse(&delivery.recipient_phone)?;
    if delivery.city_ref.trim().is_empty() {
        return Err(UseCaseError::invalid("Choose a city"));
    }
    if delivery.department_ref.trim().is_empty() {
        return Err(UseCaseError::invalid("Choose a delivery department"));
    }
    Ok(DeliveryDetails {
        recipient_name: recipient_name.to_string(),
        recipient_phone: phone.as_str().to_string(),
        ..delivery.clone()
    })
}
