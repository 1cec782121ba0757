//! Order repository and checkout transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use shoe_store_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem};

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, price";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_date: DateTime<Utc>,
    total_amount: Decimal,
    payment_method: String,
    status: OrderStatus,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            order_date: self.order_date,
            total_amount: self.total_amount,
            payment_method: self.payment_method,
            status: self.status,
            items,
        }
    }
}

/// A cart line read under lock at checkout, priced from the live product.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open a checkout transaction and lock the user's cart lines.
    ///
    /// Concurrent checkouts for the same user wait on the row locks; once the
    /// first commits, the second sees an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction cannot be opened
    /// or the cart cannot be read.
    pub async fn begin_checkout(&self, user_id: UserId) -> Result<Checkout, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let lines = sqlx::query_as(
            r"
            SELECT c.product_id, p.name AS product_name, p.price, c.quantity
            FROM shop.cart_item c
            JOIN shop.product p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY c.id
            FOR UPDATE OF c
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        Ok(Checkout { tx, user_id, lines })
    }

    /// List a user's orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r"
            SELECT id, order_date, total_amount, payment_method, status
            FROM shop.order
            WHERE user_id = $1
            ORDER BY order_date DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = rows.iter().map(|r| r.id.as_i32()).collect();
        let items: Vec<OrderItem> = sqlx::query_as(&format!(
            "SELECT {ITEM_COLUMNS} FROM shop.order_item WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }

    /// Set the status of the order paid through `payment_intent_id`.
    ///
    /// Paid orders are final and are not changed. Returns the order ID if a
    /// row was updated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status_by_payment_intent(
        &self,
        payment_intent_id: &str,
        status: OrderStatus,
    ) -> Result<Option<OrderId>, RepositoryError> {
        let id = sqlx::query_scalar(
            r"
            UPDATE shop.order
            SET status = $2
            WHERE payment_intent_id = $1 AND status <> 'paid'
            RETURNING id
            ",
        )
        .bind(payment_intent_id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        Ok(id)
    }
}

/// An open checkout transaction.
///
/// Dropping it without calling [`Checkout::complete`] rolls everything back,
/// leaving the cart untouched.
pub struct Checkout {
    tx: Transaction<'static, Postgres>,
    user_id: UserId,
    lines: Vec<CheckoutLine>,
}

impl Checkout {
    /// The locked cart lines.
    #[must_use]
    pub fn lines(&self) -> &[CheckoutLine] {
        &self.lines
    }

    /// Insert the order and one item per cart line at the copied price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if an insert fails.
    pub async fn create_order(
        &mut self,
        total_amount: Decimal,
        payment_method: &str,
    ) -> Result<Order, RepositoryError> {
        let row: OrderRow = sqlx::query_as(
            r"
            INSERT INTO shop.order (user_id, total_amount, payment_method)
            VALUES ($1, $2, $3)
            RETURNING id, order_date, total_amount, payment_method, status
            ",
        )
        .bind(self.user_id)
        .bind(total_amount)
        .bind(payment_method)
        .fetch_one(&mut *self.tx)
        .await?;

        let mut items = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let item: OrderItem = sqlx::query_as(&format!(
                r"
                INSERT INTO shop.order_item (order_id, product_id, product_name, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING {ITEM_COLUMNS}
                "
            ))
            .bind(row.id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.price)
            .fetch_one(&mut *self.tx)
            .await?;
            items.push(item);
        }

        Ok(row.into_order(items))
    }

    /// Record the payment intent, remove the ordered cart lines and commit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement or the commit fails.
    pub async fn complete(
        mut self,
        order_id: OrderId,
        payment_intent_id: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE shop.order SET payment_intent_id = $2 WHERE id = $1")
            .bind(order_id)
            .bind(payment_intent_id)
            .execute(&mut *self.tx)
            .await?;

        // Only the lines that were ordered; anything added since stays.
        let product_ids: Vec<i32> = self.lines.iter().map(|l| l.product_id.as_i32()).collect();
        sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1 AND product_id = ANY($2)")
            .bind(self.user_id)
            .bind(&product_ids)
            .execute(&mut *self.tx)
            .await?;

        self.tx.commit().await?;
        Ok(())
    }
}
