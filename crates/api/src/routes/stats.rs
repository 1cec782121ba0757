//! Admin sales report route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use crate::db::StatsRepository;
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::stats::LimitQuery;
use crate::models::{CategorySales, LoyalCustomer, TopProduct};
use crate::state::AppState;

/// Best-selling products.
#[instrument(skip(state, _admin))]
pub async fn top_products(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<TopProduct>>> {
    let rows = StatsRepository::new(state.pool())
        .top_products(query.resolve())
        .await?;
    Ok(Json(rows))
}

/// Customers ranked by total spent.
#[instrument(skip(state, _admin))]
pub async fn loyal_customers(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<LoyalCustomer>>> {
    let rows = StatsRepository::new(state.pool())
        .loyal_customers(query.resolve())
        .await?;
    Ok(Json(rows))
}

/// Paid sales per category.
#[instrument(skip(state, _admin))]
pub async fn categories(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<CategorySales>>> {
    let rows = StatsRepository::new(state.pool()).category_sales().await?;
    Ok(Json(rows))
}
