//! Catalog products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shoe_store_core::ProductId;

use super::{AMOUNT_SCALE, MAX_AMOUNT};

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of admin create/update requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ProductInput {
    /// Check required fields and normalize optional ones.
    ///
    /// Blank optional strings become `None`.
    ///
    /// # Errors
    ///
    /// Returns a client-facing message when a required field is blank or the
    /// price is negative, too large, or has more than two decimal places.
    pub fn validated(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_owned();
        self.description = self.description.trim().to_owned();

        if self.name.is_empty() {
            return Err("Product name is required".to_owned());
        }
        if self.description.is_empty() {
            return Err("Product description is required".to_owned());
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err("Price cannot be negative".to_owned());
        }
        if self.price > MAX_AMOUNT {
            return Err(format!("Price cannot exceed {MAX_AMOUNT}"));
        }
        if self.price.normalize().scale() > AMOUNT_SCALE {
            return Err("Price can have at most 2 decimal places".to_owned());
        }

        self.image_url = non_blank(self.image_url);
        self.category = non_blank(self.category);
        Ok(self)
    }
}

/// Catalog listing filters (`?search=&category=&minPrice=&maxPrice=`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    /// Search term with surrounding whitespace removed, if any remains.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Category name with surrounding whitespace removed, if any remains.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(name: &str, price: &str) -> ProductInput {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "description": "Lightweight trainer",
            "price": price.parse::<f64>().unwrap(),
            "imageUrl": "  ",
            "category": "Running"
        }))
        .unwrap()
    }

    #[test]
    fn test_input_accepts_camel_case_numbers() {
        let product = input("Pegasus 41", "129.99").validated().unwrap();
        assert_eq!(product.price, Decimal::new(12_999, 2));
        assert_eq!(product.category.as_deref(), Some("Running"));
        assert!(product.image_url.is_none());
    }

    #[test]
    fn test_input_rejects_blank_name() {
        assert!(input("   ", "10").validated().is_err());
    }

    #[test]
    fn test_input_rejects_negative_price() {
        assert!(input("Slide", "-1").validated().is_err());
        assert!(input("Slide", "0").validated().is_ok());
    }

    #[test]
    fn test_input_rejects_price_outside_column() {
        assert!(input("Slide", "10000000000").validated().is_err());
        assert!(input("Slide", "9999999999.99").validated().is_ok());
        assert!(input("Slide", "19.999").validated().is_err());
        assert!(input("Slide", "19.90").validated().is_ok());
    }

    #[test]
    fn test_filter_ignores_blank_terms() {
        let filter = ProductFilter {
            search: Some("  ".to_owned()),
            category: Some(" Running ".to_owned()),
            ..Default::default()
        };
        assert_eq!(filter.search_term(), None);
        assert_eq!(filter.category_name(), Some("Running"));
    }

    #[test]
    fn test_price_serializes_as_number() {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(1),
            name: "Pegasus 41".to_owned(),
            description: "Trainer".to_owned(),
            price: Decimal::new(12_999, 2),
            image_url: None,
            category: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["price"], serde_json::json!(129.99));
        assert!(json.get("imageUrl").is_some());
    }
}
