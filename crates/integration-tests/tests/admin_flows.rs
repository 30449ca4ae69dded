//! End-to-end flows through the admin router against the stub backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::Value;

use storedesk_core::PromoCode;
use storedesk_integration_tests::{OWNER_EMAIL, STAFF_EMAIL, TestApp, location};

async fn app() -> TestApp {
    TestApp::spawn().await.expect("Failed to start test app")
}

async fn signed_in(email: &str) -> TestApp {
    let app = app().await;
    let resp = app.login(email).await.expect("Failed to send login");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    app
}

fn product_form<'a>(name: &'a str, price: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("name", name),
        ("description", "Stoneware, 350ml"),
        ("category", "Kitchen"),
        ("price", price),
        ("sale_price", ""),
        ("in_stock", "25"),
        ("yellow_line", "10"),
        ("red_line", "3"),
        ("status", "active"),
        ("image_ids", ""),
    ]
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let app = app().await;

    let resp = app.get("/health").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = app.get("/health/ready").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_signed_out_requests_are_turned_away() {
    let app = app().await;

    let resp = app.get("/products").await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");

    let resp = app.get("/api/notifications/unread").await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_page_renders() {
    let app = app().await;

    let resp = app.get("/auth/login").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("name=\"email\""));
    assert!(body.contains("name=\"password\""));
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let app = app().await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .form(&[("email", OWNER_EMAIL), ("password", "not-the-password")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid email or password"));
    assert!(body.contains(OWNER_EMAIL), "email is kept in the form");
}

#[tokio::test]
async fn test_login_with_blank_fields_is_unprocessable() {
    let app = app().await;

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .form(&[("email", ""), ("password", "")])
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_shows_dashboard_with_welcome() {
    let app = signed_in(OWNER_EMAIL).await;

    let resp = app.get("/").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Welcome back, Olivia Owner"));
    assert!(body.contains("Corner Shop"));

    // The flash is shown once
    let body = app.get("/").await.unwrap().text().await.unwrap();
    assert!(!body.contains("Welcome back"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = signed_in(OWNER_EMAIL).await;

    let resp = app.client.post(app.url("/auth/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");

    let resp = app.get("/").await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn test_expired_token_signs_user_out() {
    let app = signed_in(OWNER_EMAIL).await;
    assert_eq!(app.get("/").await.unwrap().status(), StatusCode::OK);

    app.backend.expire_tokens();

    let resp = app.get("/api/notifications/unread").await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // The session was cleared, so pages now go to the login screen
    let resp = app.get("/products").await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn test_expired_token_on_page_redirects_to_login() {
    let app = signed_in(OWNER_EMAIL).await;
    app.backend.expire_tokens();

    let resp = app.get("/products").await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");

    let resp = app.get("/auth/login").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "session no longer holds a user");
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_list_search() {
    let app = signed_in(OWNER_EMAIL).await;
    app.backend.add_product("Ceramic Mug", "12.50", 40);
    app.backend.add_product("Tea Towel", "6.00", 2);

    let body = app.get("/products").await.unwrap().text().await.unwrap();
    assert!(body.contains("Ceramic Mug"));
    assert!(body.contains("Tea Towel"));
    assert!(body.contains("$12.50"));

    let resp = app.get("/products?q=mug").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Ceramic Mug"));
    assert!(!body.contains("Tea Towel"));
}

#[tokio::test]
async fn test_product_list_stock_filter() {
    let app = signed_in(OWNER_EMAIL).await;
    app.backend.add_product("Ceramic Mug", "12.50", 40);
    app.backend.add_product("Tea Towel", "6.00", 2);

    let body = app
        .get("/products?stock=critical")
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Tea Towel"));
    assert!(!body.contains("Ceramic Mug"));
}

#[tokio::test]
async fn test_create_product() {
    let app = signed_in(OWNER_EMAIL).await;

    let resp = app
        .client
        .post(app.url("/products"))
        .form(&product_form("Ceramic Mug", "12.50"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/products/"));

    let products = app.backend.products();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], Value::from("Ceramic Mug"));
    assert_eq!(products[0]["status"], Value::from("ACTIVE"));
}

#[tokio::test]
async fn test_create_product_validation_errors() {
    let app = signed_in(OWNER_EMAIL).await;

    let resp = app
        .client
        .post(app.url("/products"))
        .form(&product_form("", "abc"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Name must be 1-200 characters"));
    assert!(body.contains("value=\"abc\""), "submitted value is kept");
    assert!(app.backend.products().is_empty(), "nothing reaches the backend");
}

#[tokio::test]
async fn test_staff_cannot_create_products() {
    let app = signed_in(STAFF_EMAIL).await;

    let resp = app
        .client
        .post(app.url("/products"))
        .form(&product_form("Ceramic Mug", "12.50"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(app.backend.products().is_empty());
}

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn test_promo_code_endpoint() {
    let app = signed_in(OWNER_EMAIL).await;

    let resp = app.get("/api/promotions/code").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let code = body["code"].as_str().unwrap();
    assert!(PromoCode::parse(code).is_ok(), "generated code {code} is valid");
}

#[tokio::test]
async fn test_promo_code_endpoint_requires_manager() {
    let app = signed_in(STAFF_EMAIL).await;

    let resp = app.get("/api/promotions/code").await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_sync_version_and_unread_count() {
    let app = signed_in(OWNER_EMAIL).await;

    let resp = app.get("/api/sync").await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(body["version"].is_u64());

    let body: Value = app
        .get("/api/notifications/unread")
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], Value::from(0));
}

#[tokio::test]
async fn test_notification_preferences_are_kept_in_session() {
    let app = signed_in(OWNER_EMAIL).await;

    let resp = app
        .client
        .post(app.url("/api/notifications/preferences"))
        .json(&serde_json::json!({"sound": true, "desktop": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = app.get("/settings?tab=notifications").await.unwrap().text().await.unwrap();
    assert!(body.contains("data-pref-sound=\"true\""));
    assert!(body.contains("data-pref-desktop=\"false\""));
}
