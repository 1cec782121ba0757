//! Router-level tests that never reach the database.
//!
//! Authentication, role checks, webhook signature checks and the middleware
//! stack all answer before any query runs, so these run without `PostgreSQL`.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::json;

use shoe_store_core::{Role, UserId};
use shoe_store_integration_tests::{TestApp, payment_event, sign_webhook};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_is_ok() {
    let app = TestApp::without_database();
    let resp = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, "ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = TestApp::without_database();
    let resp = app.request(Method::GET, "/health/ready", None, None).await;

    assert_eq!(resp.status, StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::without_database();

    for (method, uri) in [
        (Method::GET, "/api/auth/me"),
        (Method::GET, "/api/cart"),
        (Method::GET, "/api/orders"),
        (Method::POST, "/api/orders"),
        (Method::DELETE, "/api/cart/1"),
        (Method::DELETE, "/api/comments/1"),
        (Method::GET, "/api/user"),
        (Method::GET, "/api/admin/stats/categories"),
    ] {
        let resp = app.request(method.clone(), uri, None, None).await;
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert!(resp.body["message"].is_string(), "{method} {uri}");
    }
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let app = TestApp::without_database();
    let resp = app
        .request(Method::GET, "/api/cart", Some("not.a.token"), None)
        .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = TestApp::without_database();

    let mut other = shoe_store_integration_tests::test_config("http://127.0.0.1:1");
    other.jwt.secret = "a-completely-different-signing-key-42!".to_owned().into();
    let foreign = shoe_store_api::services::auth::TokenKeys::new(&other.jwt)
        .issue(UserId::new(1), Role::Admin)
        .unwrap();

    let resp = app
        .request(Method::GET, "/api/user", Some(&foreign), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Roles
// ============================================================================

#[tokio::test]
async fn test_admin_routes_forbidden_for_shoppers() {
    let app = TestApp::without_database();
    let token = app.token(UserId::new(7), Role::User);

    let product = json!({ "name": "Runner", "description": "Fast", "price": 10 });
    for (method, uri, body) in [
        (Method::GET, "/api/user", None),
        (Method::GET, "/api/user/1", None),
        (Method::DELETE, "/api/user/1", None),
        (Method::POST, "/api/products", Some(product.clone())),
        (Method::PUT, "/api/products/1", Some(product.clone())),
        (Method::DELETE, "/api/products/1", None),
        (Method::GET, "/api/admin/stats/top-products", None),
        (Method::GET, "/api/admin/stats/loyal-customers?limit=5", None),
        (Method::GET, "/api/admin/stats/categories", None),
    ] {
        let resp = app.request(method.clone(), uri, Some(&token), body).await;
        assert_eq!(resp.status, StatusCode::FORBIDDEN, "{method} {uri}");
    }
}

// ============================================================================
// Request validation before the database
// ============================================================================

#[tokio::test]
async fn test_cart_quantity_must_be_positive() {
    let app = TestApp::without_database();
    let token = app.token(UserId::new(7), Role::User);

    let resp = app
        .request(Method::PUT, "/api/cart/3", Some(&token), Some(json!(0)))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app
        .request(
            Method::POST,
            "/api/cart",
            Some(&token),
            Some(json!({ "productId": 3, "quantity": -1 })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_quantity_is_capped() {
    let app = TestApp::without_database();
    let token = app.token(UserId::new(7), Role::User);

    let resp = app
        .request(Method::PUT, "/api/cart/3", Some(&token), Some(json!(1_001)))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Quantity cannot exceed 1000");
}

#[tokio::test]
async fn test_product_price_outside_column_rejected() {
    let app = TestApp::without_database();
    let token = app.token(UserId::new(1), Role::Admin);

    for price in [json!(1e10), json!(12.345)] {
        let resp = app
            .request(
                Method::POST,
                "/api/products",
                Some(&token),
                Some(json!({ "name": "Runner", "description": "Fast", "price": price })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{price}");
    }
}

#[tokio::test]
async fn test_checkout_requires_payment_method() {
    let app = TestApp::without_database();
    let token = app.token(UserId::new(7), Role::User);

    let resp = app
        .request(
            Method::POST,
            "/api/orders",
            Some(&token),
            Some(json!({ "paymentMethod": "  " })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["message"], "Payment method is required");
}

#[tokio::test]
async fn test_blank_comment_rejected() {
    let app = TestApp::without_database();
    let token = app.token(UserId::new(7), Role::User);

    let resp = app
        .request(
            Method::POST,
            "/api/comments/3",
            Some(&token),
            Some(json!({ "content": "   " })),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Webhook
// ============================================================================

#[tokio::test]
async fn test_webhook_without_signature_rejected() {
    let app = TestApp::without_database();
    let payload = payment_event("payment_intent.succeeded", "pi_123");

    let resp = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/payment/webhook")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_with_bad_signature_rejected() {
    let app = TestApp::without_database();
    let payload = payment_event("payment_intent.succeeded", "pi_123");
    let now = chrono::Utc::now().timestamp();

    // Signed for a different body
    let signature = sign_webhook("{}", now);
    let resp = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/payment/webhook")
                .header("stripe-signature", signature)
                .body(Body::from(payload.clone()))
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    // Outside the replay window
    let stale = sign_webhook(&payload, now - 3_600);
    let resp = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/payment/webhook")
                .header("stripe-signature", stale)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_with_extreme_timestamp_rejected() {
    let app = TestApp::without_database();
    let payload = payment_event("payment_intent.succeeded", "pi_123");

    let resp = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/payment/webhook")
                .header("stripe-signature", format!("t={},v1=00", i64::MIN))
                .body(Body::from(payload))
                .unwrap(),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_ignores_other_event_types() {
    let app = TestApp::without_database();
    let payload = payment_event("charge.refunded", "pi_123");

    let resp = app.webhook(&payload).await;
    assert_eq!(resp.status, StatusCode::OK);
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::without_database();
    let resp = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(resp.headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(resp.headers[header::X_FRAME_OPTIONS], "DENY");
    assert!(resp.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend() {
    let app = TestApp::without_database();
    let resp = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/products")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert!(resp.status.is_success());
    assert_eq!(
        resp.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::without_database();
    let resp = app.request(Method::GET, "/api/nope", None, None).await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
