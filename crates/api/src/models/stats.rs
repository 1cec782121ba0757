//! Admin sales reports.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shoe_store_core::{ProductId, UserId};

/// Default number of rows in a ranked report.
pub const DEFAULT_LIMIT: i64 = 10;
/// Largest accepted `limit`.
pub const MAX_LIMIT: i64 = 100;

/// Best-selling products.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: ProductId,
    pub name: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub total_quantity: i64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_revenue: Decimal,
}

/// Customers ranked by spend.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LoyalCustomer {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub total_orders: i64,
    pub total_quantity: i64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_spent: Decimal,
    pub last_order_date: DateTime<Utc>,
}

/// Paid sales grouped by category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub units_sold: i64,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub revenue: Decimal,
}

/// `?limit=` query parameter.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    /// Requested limit clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn resolve(self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(LimitQuery::default().resolve(), DEFAULT_LIMIT);
        assert_eq!(LimitQuery { limit: Some(5) }.resolve(), 5);
        assert_eq!(LimitQuery { limit: Some(0) }.resolve(), 1);
        assert_eq!(LimitQuery { limit: Some(-3) }.resolve(), 1);
        assert_eq!(LimitQuery { limit: Some(10_000) }.resolve(), MAX_LIMIT);
    }
}
