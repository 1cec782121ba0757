//! Seed the database with the default admin and a product catalog.
//!
//! # Usage
//!
//! ```bash
//! SEED_ADMIN_PASSWORD=... shoe-cli seed admin
//! shoe-cli seed catalog -f crates/cli/data/catalog.yaml
//! ```
//!
//! Both commands are idempotent: an existing admin account or a product with
//! the same name is left alone.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use shoe_store_api::db::{ProductRepository, UserRepository};
use shoe_store_api::models::ProductInput;
use shoe_store_api::services::users::{UserInput, UserService};
use shoe_store_core::Role;

use super::{CommandError, connect};

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_EMAIL: &str = "admin@shoestore.com";

/// Catalog seed file.
///
/// ```yaml
/// products:
///   - name: Runner One
///     description: Lightweight road running shoe
///     price: 89.99
///     imageUrl: https://cdn.example.com/runner-one.jpg
///     category: Running
/// ```
#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub products: Vec<ProductInput>,
}

impl Catalog {
    /// Parse a catalog document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid catalog.
    pub fn parse(content: &str) -> Result<Self, CommandError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Counts reported after a catalog seed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub invalid: usize,
}

/// Create the default admin account unless an admin already exists.
///
/// # Errors
///
/// Returns an error if `SEED_ADMIN_PASSWORD` is missing or too weak, or if
/// database operations fail.
pub async fn admin() -> Result<(), CommandError> {
    let pool = connect().await?;

    if UserRepository::new(&pool).admin_exists().await? {
        info!("An admin account already exists, nothing to do");
        return Ok(());
    }

    let password = std::env::var("SEED_ADMIN_PASSWORD")
        .map_err(|_| CommandError::MissingEnvVar("SEED_ADMIN_PASSWORD"))?;

    let input = UserInput {
        username: DEFAULT_ADMIN_USERNAME.to_owned(),
        email: DEFAULT_ADMIN_EMAIL.to_owned(),
        password: Some(password),
        role: Some(Role::Admin),
    };
    let user = UserService::new(&pool).create(&input).await?;

    info!(user_id = %user.id, email = %user.email, "Default admin created");
    Ok(())
}

/// Insert the products of a catalog file that are not in the store yet.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if database
/// operations fail. Individual invalid products are logged and skipped.
pub async fn catalog(file_path: &str) -> Result<SeedSummary, CommandError> {
    let path = Path::new(file_path);
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_owned(),
            source,
        })?;

    // Parse before connecting so a typo fails fast
    let catalog = Catalog::parse(&content)?;
    info!(products = catalog.products.len(), path = %file_path, "Parsed catalog");

    let pool = connect().await?;
    let products = ProductRepository::new(&pool);
    let mut summary = SeedSummary::default();

    for input in catalog.products {
        let input = match input.validated() {
            Ok(input) => input,
            Err(reason) => {
                warn!(%reason, "Skipping invalid product");
                summary.invalid += 1;
                continue;
            }
        };

        if products.name_exists(&input.name).await? {
            summary.skipped += 1;
            continue;
        }

        let product = products.create(&input).await?;
        info!(product_id = %product.id, name = %product.name, "Product inserted");
        summary.inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {}", summary.inserted);
    info!("  Products skipped (already exist): {}", summary.skipped);
    if summary.invalid > 0 {
        warn!("  Products rejected: {}", summary.invalid);
    }

    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::parse(
            r"
products:
  - name: Runner One
    description: Lightweight road running shoe
    price: 89.99
    imageUrl: https://cdn.example.com/runner-one.jpg
    category: Running
  - name: Court Classic
    description: Leather tennis shoe
    price: 120
",
        )
        .unwrap();

        assert_eq!(catalog.products.len(), 2);
        assert_eq!(catalog.products[0].category.as_deref(), Some("Running"));
        assert_eq!(catalog.products[1].price.to_string(), "120");
        assert!(catalog.products[1].image_url.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let result = Catalog::parse("products:\n  - name: No description\n    price: 10\n");
        assert!(matches!(result, Err(CommandError::Yaml(_))));
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let catalog = Catalog::parse(include_str!("../../data/catalog.yaml")).unwrap();

        assert!(!catalog.products.is_empty());
        for product in catalog.products {
            assert!(product.validated().is_ok());
        }
    }
}
