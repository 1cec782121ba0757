//! Orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shoe_store_core::{OrderId, OrderItemId, OrderStatus, ProductId};

/// A placed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_date: DateTime<Utc>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_amount: Decimal,
    pub payment_method: String,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
}

/// A line of an order, priced at checkout time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(skip)]
    pub id: OrderItemId,
    #[serde(skip)]
    pub order_id: OrderId,
    /// `None` once the product has been deleted from the catalog.
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: i32,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
}

/// Response of `POST /api/orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    #[serde(flatten)]
    pub order: Order,
    /// Handed to the payment form in the browser.
    pub client_secret: String,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl OrderRequest {
    /// The requested payment method, if it is not blank.
    #[must_use]
    pub fn payment_method(&self) -> Option<&str> {
        self.payment_method
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Sum of unit price times quantity over `lines`.
///
/// Returns `None` on overflow.
#[must_use]
pub fn order_total<'a, I>(lines: I) -> Option<Decimal>
where
    I: IntoIterator<Item = (&'a Decimal, i32)>,
{
    lines
        .into_iter()
        .try_fold(Decimal::ZERO, |total, (price, quantity)| {
            price
                .checked_mul(Decimal::from(quantity))
                .and_then(|line| total.checked_add(line))
        })
}
