#![allow(clippy::unwrap_used)]
// Integration tests for `CatalogClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storefront_api::{CatalogClient, Error, Product};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CatalogClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = CatalogClient::with_client(reqwest::Client::new(), base_url, "demo-shop".into());
    (server, client)
}

fn admin_path(suffix: &str) -> String {
    format!("/api/demo-shop/admin/{suffix}")
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/signin"))
        .and(body_json(json!({
            "username": "admin@example.com",
            "password": "test-password",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-abc123",
            "expired": 4_102_444_800_000_i64,
        })))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "test-password".to_string().into();
    let session = client.sign_in("admin@example.com", &secret).await.unwrap();

    assert_eq!(session.token, "tok-abc123");
    assert!(!session.is_expired());
}

#[tokio::test]
async fn test_sign_in_failure_extracts_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/admin/signin"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "帳號或密碼錯誤",
        })))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.sign_in("admin@example.com", &secret).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(!message.is_empty(), "expected a non-empty error message");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_check_auth_accepts_valid_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/user/check"))
        .and(header("Authorization", "tok-abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    client.set_token("tok-abc123".into());
    assert!(client.check_auth().await.unwrap());
}

#[tokio::test]
async fn test_check_auth_rejection_is_not_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/user/check"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    client.set_token("stale-token".into());
    assert!(!client.check_auth().await.unwrap());
}

// ── Product tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_products() {
    let (server, client) = setup().await;

    let envelope = json!({
        "success": true,
        "products": [{
            "id": "-Nprod001",
            "title": "Espresso Blend",
            "category": "coffee",
            "origin_price": 450,
            "price": "399",
            "unit": "bag",
            "description": "dark roast",
            "content": "250g whole bean",
            "is_enabled": 1,
            "imageUrl": "https://cdn.example/espresso.png",
            "imagesUrl": ["https://cdn.example/espresso-2.png"]
        }]
    });

    Mock::given(method("GET"))
        .and(path(admin_path("products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(&envelope))
        .mount(&server)
        .await;

    let products = client.list_products().await.unwrap();

    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id.as_deref(), Some("-Nprod001"));
    assert_eq!(products[0].title, "Espresso Blend");
    assert!((products[0].price - 399.0).abs() < f64::EPSILON);
    assert!(products[0].is_enabled);
    assert_eq!(products[0].images_url.len(), 1);
}

#[tokio::test]
async fn test_create_product_wraps_in_data_envelope() {
    let (server, client) = setup().await;

    let product = Product {
        title: "Widget".into(),
        category: "misc".into(),
        origin_price: 100.0,
        price: 80.0,
        unit: "piece".into(),
        is_enabled: true,
        ..Product::default()
    };

    Mock::given(method("POST"))
        .and(path(admin_path("product")))
        .and(header("Authorization", "tok-abc123"))
        .and(body_json(json!({ "data": {
            "title": "Widget",
            "category": "misc",
            "origin_price": 100.0,
            "price": 80.0,
            "unit": "piece",
            "description": "",
            "content": "",
            "is_enabled": 1,
            "imageUrl": "",
            "imagesUrl": [],
        }})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    client.set_token("tok-abc123".into());
    client.create_product(&product).await.unwrap();
}

#[tokio::test]
async fn test_update_product() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(admin_path("product/-Nprod001")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let product = Product {
        id: Some("-Nprod001".into()),
        title: "Renamed".into(),
        ..Product::default()
    };
    client.update_product("-Nprod001", &product).await.unwrap();
}

#[tokio::test]
async fn test_delete_product_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(admin_path("product/gone")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "product not found",
        })))
        .mount(&server)
        .await;

    let result = client.delete_product("gone").await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("not found"), "got: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
    assert!(
        Error::Api {
            status: 404,
            message: String::new(),
        }
        .is_not_found()
    );
}

#[tokio::test]
async fn test_session_expiry_surfaces_as_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(admin_path("products")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_products().await;

    assert!(
        matches!(result, Err(Error::SessionExpired)),
        "expected SessionExpired, got: {result:?}"
    );
}

#[tokio::test]
async fn test_success_false_ack_is_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(admin_path("product")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": ["title is required"],
        })))
        .mount(&server)
        .await;

    let result = client.create_product(&Product::default()).await;

    match result {
        Err(Error::Api { ref message, .. }) => {
            assert!(message.contains("title is required"), "got: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
