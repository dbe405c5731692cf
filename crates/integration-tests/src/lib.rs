//! Integration tests for Brewmart.
//!
//! Every test runs the real client stack (HTTP clients, repositories,
//! use-cases and view-models) against two `wiremock` servers: one playing
//! the backend (REST, storage and auth under one project URL) and one
//! playing the shipping carrier.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p brewmart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - Product listing, search and image signing
//! - `auth` - Sign-in, sign-up codes and sign-out
//! - `shipping` - Carrier envelopes and errors
//! - `checkout` - Order placement and the checkout screen

#![allow(clippy::missing_panics_doc)]

use std::time::Duration;

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use brewmart_client::{ClientConfig, Storefront};

/// Anon key the mocked backend expects.
pub const ANON_KEY: &str = "test-anon-key";

/// Access token issued by the mocked auth endpoints.
pub const ACCESS_TOKEN: &str = "test-access-token";

/// API key the mocked carrier expects.
pub const CARRIER_KEY: &str = "test-carrier-key";

/// ID of the account every session belongs to.
pub const USER_ID: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

pub const EMAIL: &str = "olena@example.com";

pub const PASSWORD: &str = "correct horse";

/// Carrier endpoint path below the carrier mock.
pub const CARRIER_PATH: &str = "/v2.0/json/";

/// Debounce window used by the storefront under test.
pub const DEBOUNCE: Duration = Duration::from_millis(50);

/// Mock servers plus a storefront wired to them.
pub struct TestContext {
    pub backend: MockServer,
    pub carrier: MockServer,
    pub storefront: Storefront,
}

impl TestContext {
    /// Start both mock servers and build a storefront pointing at them.
    pub async fn start() -> Self {
        let backend = MockServer::start().await;
        let carrier = MockServer::start().await;

        let mut config = ClientConfig::with_endpoints(
            Url::parse(&backend.uri()).expect("backend mock URL"),
            ANON_KEY,
            Url::parse(&format!("{}{CARRIER_PATH}", carrier.uri())).expect("carrier mock URL"),
            CARRIER_KEY,
        );
        config.catalog.search_debounce = DEBOUNCE;

        Self {
            storefront: Storefront::new(config),
            backend,
            carrier,
        }
    }

    /// Answer every storage signing request for the products bucket.
    pub async fn mount_signing(&self) {
        Mock::given(method("POST"))
            .and(path_regex(r"^/storage/v1/object/sign/products/.+$"))
            .respond_with(EchoSignedUrl)
            .mount(&self.backend)
            .await;
    }

    /// Accept [`EMAIL`] / [`PASSWORD`] and sign in through the storefront.
    pub async fn sign_in(&self) {
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body()))
            .mount(&self.backend)
            .await;

        self.storefront
            .auth()
            .sign_in(EMAIL, PASSWORD)
            .await
            .expect("sign in against mock");
    }

    /// The absolute URL the storefront builds for a signed object.
    #[must_use]
    pub fn signed(&self, object: &str) -> String {
        format!(
            "{}/storage/v1/object/sign/products/{object}?token=signed",
            self.backend.uri()
        )
    }
}

/// Storage responder: signs whatever path was requested.
///
/// The real API answers with a URL relative to `/storage/v1`.
pub struct EchoSignedUrl;

impl Respond for EchoSignedUrl {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let relative = request
            .url
            .path()
            .trim_start_matches("/storage/v1")
            .to_string();
        ResponseTemplate::new(200).set_body_json(json!({
            "signedURL": format!("{relative}?token=signed"),
        }))
    }
}

/// Token endpoint response for [`USER_ID`].
#[must_use]
pub fn session_body() -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": "test-refresh-token",
        "expires_in": 3600,
        "token_type": "bearer",
        "user": {
            "id": USER_ID,
            "email": EMAIL,
            "user_metadata": { "first_name": "Olena", "last_name": "Kovalenko" }
        }
    })
}

/// A `products` row as the REST layer returns it.
#[must_use]
pub fn product_row(id: i64, name: &str, price: u32, image: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name}, freshly roasted"),
        "price": price,
        "image_path": image,
        "category_id": 1,
        "volume": "250 g",
        "is_available": true,
        "created_at": "2026-09-01T10:00:00Z"
    })
}

/// Flattened delivery columns shared by `addresses` and `orders`.
#[must_use]
pub fn delivery_columns() -> Value {
    json!({
        "recipient_name": "Olena Kovalenko",
        "recipient_phone": "+380671234567",
        "city_name": "Львів",
        "city_ref": "db5c88f5-391c-11dd-90d9-001a92567626",
        "department_name": "Відділення №12",
        "department_ref": "7b422fc5-e1b8-11e3-8c4a-0050568002cf"
    })
}

/// Merge two JSON objects; keys in `extra` win.
#[must_use]
pub fn merged(base: Value, extra: Value) -> Value {
    let mut base = base;
    if let (Some(target), Value::Object(extra)) = (base.as_object_mut(), extra) {
        target.extend(extra);
    }
    base
}

/// A successful carrier envelope around `data`.
#[must_use]
pub fn carrier_ok(data: Value) -> Value {
    let total = data.as_array().map_or(0, Vec::len);
    json!({
        "success": true,
        "data": data,
        "errors": [],
        "warnings": [],
        "info": { "totalCount": total }
    })
}
