//! Checkout and order history route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::order::OrderRequest;
use crate::models::{Order, PlacedOrder};
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Place an order for everything in the caller's cart.
#[instrument(skip(state, user, request), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<OrderRequest>,
) -> Result<Json<PlacedOrder>> {
    let placed = OrderService::new(state.pool(), state.stripe())
        .place_order(user.id, request.payment_method())
        .await?;
    Ok(Json(placed))
}

/// The caller's orders, newest first.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderService::new(state.pool(), state.stripe())
        .list(user.id)
        .await?;
    Ok(Json(orders))
}
