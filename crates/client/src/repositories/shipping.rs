//! Shipping-carrier lookups.

use async_trait::async_trait;

use crate::models::{City, Department};
use crate::shipping::{ShippingClient, ShippingError};

/// City and branch-office search at the shipping carrier.
#[async_trait]
pub trait ShippingRepository: Send + Sync {
    async fn cities(&self, query: &str) -> Result<Vec<City>, ShippingError>;

    async fn departments(
        &self,
        city_reference: &str,
        query: &str,
    ) -> Result<Vec<Department>, ShippingError>;
}

/// [`ShippingRepository`] over the carrier's JSON API.
#[derive(Debug, Clone)]
pub struct RemoteShippingRepository {
    client: ShippingClient,
    limit: usize,
}

impl RemoteShippingRepository {
    /// `limit` caps each lookup's result list.
    #[must_use]
    pub const fn new(client: ShippingClient, limit: usize) -> Self {
        Self { client, limit }
    }
}

#[async_trait]
impl ShippingRepository for RemoteShippingRepository {
    async fn cities(&self, query: &str) -> Result<Vec<City>, ShippingError> {
        self.client.search_cities(query, self.limit).await
    }

    async fn departments(
        &self,
        city_reference: &str,
        query: &str,
    ) -> Result<Vec<Department>, ShippingError> {
        self.client
            .search_departments(city_reference, query, self.limit)
            .await
    }
}
