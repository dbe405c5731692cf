//! Order repository.

use async_trait::async_trait;
use tracing::instrument;

use brewmart_core::{OrderId, UserId};

use super::PRODUCT_JOIN;
use crate::backend::{BackendClient, BackendError, Direction};
use crate::models::{NewOrder, NewOrderItem, Order, OrderItemRow, OrderRow};

/// Placed orders and their line items.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// The user's orders, newest first, with items.
    async fn orders(&self, user: UserId) -> Result<Vec<Order>, BackendError>;

    /// One order with items.
    async fn order(&self, id: OrderId) -> Result<Order, BackendError>;

    /// Insert the order header. The returned order has no items yet.
    async fn create_order(&self, order: &NewOrder) -> Result<Order, BackendError>;

    /// Insert every line of an order in one request.
    async fn add_order_items(&self, items: &[NewOrderItem]) -> Result<(), BackendError>;
}

/// [`OrderRepository`] backed by the REST layer.
#[derive(Debug, Clone)]
pub struct RemoteOrderRepository {
    backend: BackendClient,
}

impl RemoteOrderRepository {
    #[must_use]
    pub const fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    fn order_columns() -> String {
        format!("*,items:order_items(id,quantity,unit_price,{PRODUCT_JOIN})")
    }
}

#[async_trait]
impl OrderRepository for RemoteOrderRepository {
    #[instrument(skip(self))]
    async fn orders(&self, user: UserId) -> Result<Vec<Order>, BackendError> {
        let rows: Vec<OrderRow> = self
            .backend
            .from("orders")
            .select(&Self::order_columns())
            .eq("user_id", user)
            .order("created_at", Direction::Descending)
            .select_all()
            .await?;
        Ok(rows.into_iter().map(Order::from).collect())
    }

    #[instrument(skip(self))]
    async fn order(&self, id: OrderId) -> Result<Order, BackendError> {
        let row: OrderRow = self
            .backend
            .from("orders")
            .select(&Self::order_columns())
            .eq("id", id)
            .single()
            .await?;
        Ok(row.into())
    }

    #[instrument(skip(self, order), fields(user = %order.user_id, total = %order.total))]
    async fn create_order(&self, order: &NewOrder) -> Result<Order, BackendError> {
        let rows: Vec<OrderRow> = self
            .backend
            .from("orders")
            .select("*")
            .insert(order)
            .await?;
        rows.into_iter()
            .next()
            .map(Order::from)
            .ok_or_else(|| BackendError::NotFound("no row returned from 'orders'".to_string()))
    }

    #[instrument(skip(self, items), fields(count = items.len()))]
    async fn add_order_items(&self, items: &[NewOrderItem]) -> Result<(), BackendError> {
        if items.is_empty() {
            return Ok(());
        }
        let _: Vec<OrderItemRow> = self
            .backend
            .from("order_items")
            .select("id,quantity,unit_price")
            .insert(items)
            .await?;
        Ok(())
    }
}
