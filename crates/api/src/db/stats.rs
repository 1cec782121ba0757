//! Sales report queries for the admin dashboard.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{CategorySales, LoyalCustomer, TopProduct};

/// Repository for aggregate sales queries.
pub struct StatsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StatsRepository<'a> {
    /// Create a new stats repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Products ranked by units sold across orders that did not fail.
    ///
    /// Lines of deleted products are left out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_products(&self, limit: i64) -> Result<Vec<TopProduct>, RepositoryError> {
        let rows = sqlx::query_as(
            r"
            SELECT p.id AS product_id, p.name, p.image_url, p.category,
                   SUM(oi.quantity)::BIGINT AS total_quantity,
                   SUM(oi.price * oi.quantity) AS total_revenue
            FROM shop.order_item oi
            JOIN shop.order o ON o.id = oi.order_id
            JOIN shop.product p ON p.id = oi.product_id
            WHERE o.status <> 'failed'
            GROUP BY p.id
            ORDER BY total_quantity DESC, total_revenue DESC, p.id
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Customers ranked by total spent across orders that did not fail.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn loyal_customers(&self, limit: i64) -> Result<Vec<LoyalCustomer>, RepositoryError> {
        let rows = sqlx::query_as(
            r"
            SELECT u.id AS user_id, u.username, u.email,
                   COUNT(o.id) AS total_orders,
                   COALESCE(SUM(q.quantity), 0)::BIGINT AS total_quantity,
                   SUM(o.total_amount) AS total_spent,
                   MAX(o.order_date) AS last_order_date
            FROM shop.order o
            JOIN shop.user u ON u.id = o.user_id
            LEFT JOIN (
                SELECT order_id, SUM(quantity) AS quantity
                FROM shop.order_item
                GROUP BY order_id
            ) q ON q.order_id = o.id
            WHERE o.status <> 'failed'
            GROUP BY u.id
            ORDER BY total_spent DESC, total_orders DESC, u.id
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Units and revenue per category across paid orders.
    ///
    /// Lines whose product was deleted or has no category are grouped as
    /// `Uncategorized`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn category_sales(&self) -> Result<Vec<CategorySales>, RepositoryError> {
        let rows = sqlx::query_as(
            r"
            SELECT COALESCE(p.category, 'Uncategorized') AS category,
                   SUM(oi.quantity)::BIGINT AS units_sold,
                   SUM(oi.price * oi.quantity) AS revenue
            FROM shop.order_item oi
            JOIN shop.order o ON o.id = oi.order_id
            LEFT JOIN shop.product p ON p.id = oi.product_id
            WHERE o.status = 'paid'
            GROUP BY 1
            ORDER BY revenue DESC, category
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
