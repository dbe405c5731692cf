//! Shipping carrier lookups (cities and branch departments).
//!
//! The carrier exposes a single JSON endpoint; every call posts an envelope
//! naming the model and method:
//!
//! ```json
//! {
//!   "apiKey": "...",
//!   "modelName": "Address",
//!   "calledMethod": "getCities",
//!   "methodProperties": { "FindByString": "Ки", "Limit": "20" }
//! }
//! ```
//!
//! Responses always come back with HTTP 200; failures are reported through
//! `success: false` and an `errors` array.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::config::ShippingConfig;
use crate::models::{City, Department};

/// Errors that can occur when talking to the carrier.
#[derive(Debug, Error)]
pub enum ShippingError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The carrier rejected the call.
    #[error("Carrier error: {0}")]
    Carrier(String),
}

impl ShippingError {
    /// Whether the failure happened below HTTP (no response was received).
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect() || e.is_timeout() || e.is_request())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CityRecord {
    #[serde(rename = "Ref")]
    reference: String,
    description: String,
    #[serde(default)]
    area_description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WarehouseRecord {
    #[serde(rename = "Ref")]
    reference: String,
    description: String,
    #[serde(default)]
    number: Option<String>,
    city_ref: String,
}

impl From<CityRecord> for City {
    fn from(record: CityRecord) -> Self {
        Self {
            reference: record.reference,
            name: record.description,
            area: record.area_description.filter(|a| !a.is_empty()),
        }
    }
}

impl From<WarehouseRecord> for Department {
    fn from(record: WarehouseRecord) -> Self {
        Self {
            reference: record.reference,
            number: record.number.unwrap_or_default(),
            description: record.description,
            city_reference: record.city_ref,
        }
    }
}

/// Client for the carrier's lookup API.
#[derive(Clone)]
pub struct ShippingClient {
    http: reqwest::Client,
    api_url: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for ShippingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippingClient")
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ShippingClient {
    /// Create a new carrier client.
    #[must_use]
    pub fn new(config: &ShippingConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Find cities whose name starts with `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the carrier rejects it.
    #[instrument(skip(self))]
    pub async fn search_cities(&self, query: &str, limit: usize) -> Result<Vec<City>, ShippingError> {
        let records: Vec<CityRecord> = self
            .call(
                "Address",
                "getCities",
                json!({
                    "FindByString": query.trim(),
                    "Limit": limit.to_string(),
                    "Page": "1",
                }),
            )
            .await?;
        Ok(records.into_iter().map(City::from).collect())
    }

    /// Find branch departments in a city, optionally filtered by `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the carrier rejects it.
    #[instrument(skip(self))]
    pub async fn search_departments(
        &self,
        city_reference: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Department>, ShippingError> {
        let records: Vec<WarehouseRecord> = self
            .call(
                "AddressGeneral",
                "getWarehouses",
                json!({
                    "CityRef": city_reference,
                    "FindByString": query.trim(),
                    "Limit": limit.to_string(),
                    "Page": "1",
                }),
            )
            .await?;
        Ok(records.into_iter().map(Department::from).collect())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        properties: Value,
    ) -> Result<Vec<T>, ShippingError> {
        let body = json!({
            "apiKey": self.api_key.expose_secret(),
            "modelName": model,
            "calledMethod": method,
            "methodProperties": properties,
        });

        let response = self
            .http
            .post(self.api_url.clone())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&text)?;

        if !envelope.success {
            let message = if envelope.errors.is_empty() {
                "request was not successful".to_string()
            } else {
                envelope.errors.join("; ")
            };
            tracing::warn!(method, message = %message, "Carrier rejected lookup");
            return Err(ShippingError::Carrier(message));
        }

        Ok(envelope.data)
    }
}
