//! Money amounts and currency handling.
//!
//! Prices are stored as `NUMERIC` in the database and carried as
//! [`Decimal`] in Rust so sums never pick up floating-point drift. Payment
//! providers want integer amounts in the currency's smallest unit; use
//! [`to_minor_units`] for that conversion.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currencies charged in whole units by card processors.
///
/// Multiplying these by 100 would overcharge by two orders of magnitude.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

/// Errors that can occur when parsing a [`Currency`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Not a three-letter alphabetic code.
    #[error("currency must be a three-letter ISO 4217 code, got '{0}'")]
    InvalidCode(String),
}

/// Errors that can occur when converting an amount to minor units.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Amount is below zero.
    #[error("amount cannot be negative: {0}")]
    Negative(Decimal),
    /// Amount does not fit in an `i64` of minor units.
    #[error("amount out of range: {0}")]
    OutOfRange(Decimal),
}

/// A lowercase ISO 4217 currency code (e.g. `usd`, `vnd`).
///
/// ## Examples
///
/// ```
/// use shoe_store_core::Currency;
///
/// let usd = Currency::parse("USD").unwrap();
/// assert_eq!(usd.as_str(), "usd");
/// assert_eq!(usd.minor_unit_exponent(), 2);
///
/// let vnd = Currency::parse("vnd").unwrap();
/// assert_eq!(vnd.minor_unit_exponent(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Parse a currency code, normalising to lowercase.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::InvalidCode` unless the input is exactly three
    /// ASCII letters.
    pub fn parse(code: &str) -> Result<Self, CurrencyError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidCode(code.to_owned()));
        }
        Ok(Self(code.to_ascii_lowercase()))
    }

    /// Returns the currency code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the currency has no minor unit.
    #[must_use]
    pub fn is_zero_decimal(&self) -> bool {
        ZERO_DECIMAL_CURRENCIES.contains(&self.0.as_str())
    }

    /// Number of decimal places between the major and minor unit.
    #[must_use]
    pub fn minor_unit_exponent(&self) -> u32 {
        if self.is_zero_decimal() { 0 } else { 2 }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self("usd".to_owned())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Convert a decimal amount into integer minor units of `currency`.
///
/// Amounts are rounded half away from zero to the currency's precision first,
/// so `19.995 USD` becomes `2000` cents.
///
/// # Errors
///
/// Returns `MoneyError::Negative` for amounts below zero and
/// `MoneyError::OutOfRange` when the result does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal, currency: &Currency) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative(amount));
    }

    let exponent = currency.minor_unit_exponent();
    let rounded = amount.round_dp_with_strategy(exponent, RoundingStrategy::MidpointAwayFromZero);
    let scaled = rounded
        .checked_mul(Decimal::from(10_i64.pow(exponent)))
        .ok_or(MoneyError::OutOfRange(amount))?;

    scaled.trunc().to_i64().ok_or(MoneyError::OutOfRange(amount))
}
