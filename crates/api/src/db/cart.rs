//! Cart repository.

use sqlx::PgPool;

use shoe_store_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartItem, Product};

#[derive(sqlx::FromRow)]
struct CartRow {
    cart_item_id: CartItemId,
    user_id: UserId,
    quantity: i32,
    #[sqlx(flatten)]
    product: Product,
}

impl From<CartRow> for CartItem {
    fn from(row: CartRow) -> Self {
        Self {
            id: row.cart_item_id,
            user_id: row.user_id,
            product_id: row.product.id,
            quantity: row.quantity,
            product: row.product,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's cart lines with their products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows: Vec<CartRow> = sqlx::query_as(
            r"
            SELECT c.id AS cart_item_id, c.user_id, c.quantity,
                   p.id, p.name, p.description, p.price, p.image_url, p.category,
                   p.created_at, p.updated_at
            FROM shop.cart_item c
            JOIN shop.product p ON p.id = c.product_id
            WHERE c.user_id = $1
            ORDER BY c.id
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Add `quantity` of a product, incrementing an existing line up to
    /// `max_quantity`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
        max_quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.cart_item (user_id, product_id, quantity)
            VALUES ($1, $2, LEAST($3, $4))
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = LEAST(
                shop.cart_item.quantity::BIGINT + EXCLUDED.quantity, $4
            )::INTEGER
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(max_quantity)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::from(e)
        })?;

        Ok(())
    }

    /// Set the quantity of an existing line.
    ///
    /// Returns `false` if the user has no line for this product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.cart_item SET quantity = $3 WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a line from the cart.
    ///
    /// Returns `false` if there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM shop.cart_item WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
