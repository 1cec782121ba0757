//! Domain models and request/response bodies.
//!
//! JSON field names are `camelCase` to match what the browser frontend sends
//! and reads. Prices serialize as JSON numbers.

pub mod cart;
pub mod comment;
pub mod order;
pub mod product;
pub mod stats;
pub mod user;

pub use cart::CartItem;
pub use comment::Comment;
pub use order::{Order, OrderItem, PlacedOrder};
pub use product::{Product, ProductFilter, ProductInput};
pub use stats::{CategorySales, LoyalCustomer, TopProduct};
pub use user::User;

use rust_decimal::Decimal;

/// Largest amount a `NUMERIC(12, 2)` price or total column holds
/// (`9_999_999_999.99`).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

/// Decimal places kept by price and total columns.
pub const AMOUNT_SCALE: u32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_amount_matches_column() {
        assert_eq!(MAX_AMOUNT, Decimal::new(999_999_999_999, 2));
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
    }
}
