//! Shipping-carrier lookups for checkout.

use std::sync::Arc;

use super::failed;
use crate::error::{Outcome, UseCaseError};
use crate::models::{City, Department};
use crate::repositories::ShippingRepository;

/// City and department search.
#[derive(Clone)]
pub struct ShippingUseCases {
    shipping: Arc<dyn ShippingRepository>,
}

impl ShippingUseCases {
    #[must_use]
    pub fn new(shipping: Arc<dyn ShippingRepository>) -> Self {
        Self { shipping }
    }

    /// Cities matching `query`. A blank query yields an empty list without a
    /// request.
    ///
    /// # Errors
    ///
    /// Fails if the carrier request fails.
    pub async fn search_cities(&self, query: &str) -> Outcome<Vec<City>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.shipping
            .cities(query)
            .await
            .map_err(failed("search_cities"))
    }

    /// Departments of a city. A blank query lists all of them.
    ///
    /// # Errors
    ///
    /// Fails with `Invalid` without a city, or if the carrier request fails.
    pub async fn search_departments(
        &self,
        city_reference: &str,
        query: &str,
    ) -> Outcome<Vec<Department>> {
        if city_reference.trim().is_empty() {
            return Err(UseCaseError::invalid("Choose a city"));
        }
        self.shipping
            .departments(city_reference, query.trim())
            .await
            .map_err(failed("search_departments"))
    }
}
