//! Comment repository.

use sqlx::PgPool;

use shoe_store_core::{CommentId, ProductId, UserId};

use super::RepositoryError;
use crate::models::Comment;

/// Repository for comment database operations.
pub struct CommentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        content: &str,
    ) -> Result<Comment, RepositoryError> {
        sqlx::query_as(
            r"
            WITH inserted AS (
                INSERT INTO shop.comment (content, user_id, product_id)
                VALUES ($1, $2, $3)
                RETURNING id, content, created_at, user_id, product_id
            )
            SELECT i.id, i.content, i.created_at, i.user_id, u.username, i.product_id
            FROM inserted i
            JOIN shop.user u ON u.id = i.user_id
            ",
        )
        .bind(content)
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::from(e)
        })
    }

    /// Get a comment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CommentId) -> Result<Option<Comment>, RepositoryError> {
        let comment = sqlx::query_as(
            r"
            SELECT c.id, c.content, c.created_at, c.user_id, u.username, c.product_id
            FROM shop.comment c
            JOIN shop.user u ON u.id = c.user_id
            WHERE c.id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(comment)
    }

    /// List a product's comments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Comment>, RepositoryError> {
        let comments = sqlx::query_as(
            r"
            SELECT c.id, c.content, c.created_at, c.user_id, u.username, c.product_id
            FROM shop.comment c
            JOIN shop.user u ON u.id = c.user_id
            WHERE c.product_id = $1
            ORDER BY c.created_at, c.id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(comments)
    }

    /// Get the author of a comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn author(&self, id: CommentId) -> Result<Option<UserId>, RepositoryError> {
        let author = sqlx::query_scalar("SELECT user_id FROM shop.comment WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(author)
    }

    /// Replace the content of a comment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: CommentId,
        content: &str,
    ) -> Result<Option<Comment>, RepositoryError> {
        let comment = sqlx::query_as(
            r"
            WITH updated AS (
                UPDATE shop.comment SET content = $2 WHERE id = $1
                RETURNING id, content, created_at, user_id, product_id
            )
            SELECT c.id, c.content, c.created_at, c.user_id, u.username, c.product_id
            FROM updated c
            JOIN shop.user u ON u.id = c.user_id
            ",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(self.pool)
        .await?;

        Ok(comment)
    }

    /// Delete a comment.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CommentId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.comment WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
