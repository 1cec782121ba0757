//! Core types for the Shoe Store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Currency, CurrencyError, MoneyError, to_minor_units};
pub use status::*;
