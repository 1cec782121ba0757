//! Product catalog repository.

use sqlx::PgPool;

use shoe_store_core::ProductId;

use super::RepositoryError;
use crate::models::{Product, ProductFilter, ProductInput};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image_url, category, created_at, updated_at";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `filter`, ordered by category then name.
    ///
    /// The search term is a case-insensitive substring match on name,
    /// description or category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let pattern = filter.search_term().map(like_pattern);

        let products = sqlx::query_as(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product
            WHERE ($1::text IS NULL
                   OR name ILIKE $1
                   OR description ILIKE $1
                   OR category ILIKE $1)
              AND ($2::text IS NULL OR LOWER(category) = LOWER($2))
              AND ($3::numeric IS NULL OR price >= $3)
              AND ($4::numeric IS NULL OR price <= $4)
            ORDER BY category NULLS LAST, name
            "
        ))
        .bind(pattern)
        .bind(filter.category_name())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Whether a product with exactly this name exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM shop.product WHERE name = $1)")
                .bind(name)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as(&format!(
            r"
            INSERT INTO shop.product (name, description, price, image_url, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.image_url.as_deref())
        .bind(input.category.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Replace every editable field of a product.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as(&format!(
            r"
            UPDATE shop.product
            SET name = $2, description = $3, price = $4, image_url = $5, category = $6
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.image_url.as_deref())
        .bind(input.category.as_deref())
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Delete a product. Cart lines and comments go with it; order lines keep
    /// their snapshot.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Build an `ILIKE` substring pattern, escaping the wildcard characters.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("runner"), "%runner%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
