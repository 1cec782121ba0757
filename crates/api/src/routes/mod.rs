//! HTTP route handlers for the store API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (database ping)
//!
//! # Auth
//! POST /api/auth/register              - Create a shopper account (rate limited)
//! POST /api/auth/login                 - Issue a bearer token (rate limited)
//! GET  /api/auth/me                    - Current user
//! PUT  /api/auth/me                    - Update current user
//!
//! # Catalog
//! GET  /api/products                   - List (?search=&category=&minPrice=&maxPrice=)
//! POST /api/products                   - Create (admin)
//! GET  /api/products/{id}              - Detail
//! PUT  /api/products/{id}              - Update (admin)
//! DELETE /api/products/{id}            - Delete (admin)
//!
//! # Cart (bearer)
//! GET  /api/cart                       - Cart lines
//! POST /api/cart                       - Add product
//! PUT  /api/cart/{productId}           - Set quantity (bare integer body)
//! DELETE /api/cart/{productId}         - Remove product
//!
//! # Orders (bearer)
//! GET  /api/orders                     - Order history
//! POST /api/orders                     - Checkout
//!
//! # Payment
//! POST /api/payment/webhook            - Stripe events (signed)
//!
//! # Comments
//! POST /api/comments/{productId}       - Comment on a product (bearer)
//! GET  /api/comments/{id}              - Detail
//! PUT  /api/comments/{id}              - Edit (author)
//! DELETE /api/comments/{id}            - Delete (author)
//! GET  /api/comments/product/{productId} - Comments on a product
//!
//! # Users (admin)
//! GET/POST /api/user, GET/PUT/DELETE /api/user/{id}
//!
//! # Reports (admin)
//! GET  /api/admin/stats/top-products?limit=
//! GET  /api/admin/stats/loyal-customers?limit=
//! GET  /api/admin/stats/categories
//! ```

pub mod auth;
pub mod cart;
pub mod comments;
pub mod health;
pub mod orders;
pub mod payment;
pub mod products;
pub mod stats;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Login and registration are rate limited per client address.
pub fn auth_routes(trust_proxy_headers: bool) -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter(trust_proxy_headers));

    Router::new()
        .route("/me", get(auth::me).put(auth::update_me))
        .merge(limited)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add))
        .route("/{product_id}", put(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", get(orders::index).post(orders::create))
}

/// Create the comment routes router.
///
/// `POST /{id}` takes a product id; the other methods take a comment id.
pub fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(comments::show)
                .post(comments::create)
                .put(comments::update)
                .delete(comments::delete),
        )
        .route("/product/{product_id}", get(comments::for_product))
}

/// Create the admin user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route(
            "/{id}",
            get(users::show).put(users::update).delete(users::delete),
        )
}

/// Create the admin report routes router.
pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/top-products", get(stats::top_products))
        .route("/loyal-customers", get(stats::loyal_customers))
        .route("/categories", get(stats::categories))
}

/// Create all routes for the API.
///
/// `trust_proxy_headers` lets the auth rate limiter key on `X-Forwarded-For`.
pub fn routes(trust_proxy_headers: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/auth", auth_routes(trust_proxy_headers))
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/orders", order_routes())
        .route("/api/payment/webhook", post(payment::webhook))
        .nest("/api/comments", comment_routes())
        .nest("/api/user", user_routes())
        .nest("/api/admin/stats", stats_routes())
}
