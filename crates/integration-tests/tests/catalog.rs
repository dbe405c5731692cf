//! Catalog reads over the REST layer, with storage-signed images.

#![allow(clippy::unwrap_used)]

use brewmart_client::ErrorKind;
use brewmart_client::viewmodels::{HomeIntent, ViewModel};
use brewmart_core::{CategoryId, ProductId};
use brewmart_integration_tests::{ANON_KEY, TestContext, product_row};
use serde_json::json;
use wiremock::matchers::{bearer_token, header, method, path, path_regex, query_param};
use wiremock::{Mock, ResponseTemplate};

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_products_are_listed_newest_first_with_signed_images() {
    let ctx = TestContext::start().await;
    ctx.mount_signing().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("select", "*"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", ANON_KEY))
        .and(bearer_token(ANON_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_row(2, "Kenya AA", 420, Some("beans/kenya.jpg")),
            product_row(1, "Sencha", 180, None),
        ])))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let products = ctx
        .storefront
        .catalog()
        .get_products(None)
        .await
        .expect("products");

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].name, "Kenya AA");
    assert_eq!(
        products[0].image_url.as_deref(),
        Some(ctx.signed("beans/kenya.jpg").as_str())
    );
    assert_eq!(products[1].image_url, None);
    assert_eq!(products[1].volume.as_deref(), Some("250 g"));
}

#[tokio::test]
async fn test_category_filter_is_sent() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("category_id", "eq.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let products = ctx
        .storefront
        .catalog()
        .get_products(Some(CategoryId::new(3)))
        .await
        .expect("products");
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("id", "eq.99"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&ctx.backend)
        .await;

    let err = ctx
        .storefront
        .catalog()
        .get_product(ProductId::new(99))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_server_error_message_is_surfaced() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/categories"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "57014",
            "message": "canceling statement due to statement timeout"
        })))
        .mount(&ctx.backend)
        .await;

    let err = ctx.storefront.catalog().get_categories().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Generic);
    assert!(err.message.contains("statement timeout"));
}

#[tokio::test]
async fn test_forbidden_row_is_a_generic_failure() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "42501",
            "message": "permission denied for table products"
        })))
        .mount(&ctx.backend)
        .await;

    let err = ctx.storefront.catalog().get_products(None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Generic);
    assert!(err.message.contains("permission denied"));
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_sends_trimmed_ilike_with_limit() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("name", "ilike.*ethiopia*"))
        .and(query_param("order", "name.asc"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_row(7, "Ethiopia Yirgacheffe", 390, None),
        ])))
        .expect(1)
        .mount(&ctx.backend)
        .await;

    let results = ctx
        .storefront
        .catalog()
        .search_products("  ethiopia ")
        .await
        .expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, ProductId::new(7));
}

#[tokio::test]
async fn test_blank_search_makes_no_request() {
    let ctx = TestContext::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&ctx.backend)
        .await;

    let results = ctx
        .storefront
        .catalog()
        .search_products("   ")
        .await
        .expect("search");
    assert!(results.is_empty());
}

// ============================================================================
// Image signing
// ============================================================================

#[tokio::test]
async fn test_signed_urls_are_cached() {
    let ctx = TestContext::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/sign/products/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signedURL": "/object/sign/products/beans/kenya.jpg?token=signed"
        })))
        .expect(1)
        .mount(&ctx.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(query_param("id", "eq.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_row(2, "Kenya AA", 420, Some("beans/kenya.jpg")),
        ])))
        .expect(2)
        .mount(&ctx.backend)
        .await;

    for _ in 0..2 {
        let product = ctx
            .storefront
            .catalog()
            .get_product(ProductId::new(2))
            .await
            .expect("product");
        assert_eq!(
            product.image_url.as_deref(),
            Some(ctx.signed("beans/kenya.jpg").as_str())
        );
    }
}

#[tokio::test]
async fn test_failed_signing_fails_the_read() {
    let ctx = TestContext::start().await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/sign/.+$"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusCode": "404",
            "error": "not_found",
            "message": "Object not found"
        })))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_row(2, "Kenya AA", 420, Some("beans/gone.jpg")),
        ])))
        .mount(&ctx.backend)
        .await;

    let err = ctx.storefront.catalog().get_products(None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.message.contains("Object not found"));
}

// ============================================================================
// Home screen
// ============================================================================

#[tokio::test]
async fn test_home_screen_loads_everything() {
    let ctx = TestContext::start().await;
    ctx.mount_signing().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Coffee", "image_path": "icons/coffee.png" },
            { "id": 2, "name": "Tea", "image_path": null },
        ])))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_row(1, "Kenya AA", 420, None),
        ])))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/promotions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "title": "Autumn blend -15%",
                "discount_percent": 15,
                "starts_at": "2020-01-01T00:00:00Z",
                "ends_at": "2999-01-01T00:00:00Z"
            },
            {
                "id": 2,
                "title": "Summer sale",
                "starts_at": "2020-06-01T00:00:00Z",
                "ends_at": "2020-08-31T00:00:00Z"
            }
        ])))
        .mount(&ctx.backend)
        .await;

    let mut home = ctx.storefront.home();
    home.on_intent(HomeIntent::Load);
    home.idle().await;

    let state = home.state();
    assert!(!state.is_loading);
    assert_eq!(state.error, None);
    assert_eq!(state.categories.len(), 2);
    assert_eq!(state.products.len(), 1);
    assert_eq!(state.promotions.len(), 1);
    assert_eq!(state.promotions[0].title, "Autumn blend -15%");
}
