//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are formatted the way the storefront displays them to its
//! Russian-speaking customers: grouped thousands separated by a no-break
//! space, a comma as decimal separator, two fraction digits and a trailing
//! currency symbol (`1 250,00 ₽`).

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// No-break space used as both the group separator and the symbol separator.
const NBSP: char = '\u{a0}';

/// Errors that can occur when validating a price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price must not be negative (got {0})")]
    Negative(Decimal),

    /// The amount could not be parsed as a decimal number.
    #[error("invalid price '{0}'")]
    Invalid(String),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., roubles, not kopecks).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the default currency.
    #[must_use]
    pub fn from_amount(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::default())
    }

    /// Format for display (e.g., `"1 250,00 ₽"`).
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{NBSP}{}",
            format_amount(self.amount),
            self.currency_code.symbol()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Validate that a unit price is not negative.
///
/// # Errors
///
/// Returns `PriceError::Negative` if the amount is below zero.
pub fn ensure_non_negative(amount: Decimal) -> Result<Decimal, PriceError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PriceError::Negative(amount));
    }
    Ok(amount)
}

/// Parse a user-supplied unit price, accepting either `.` or `,` as the
/// decimal separator.
///
/// # Errors
///
/// Returns `PriceError::Invalid` for non-numeric input and
/// `PriceError::Negative` for amounts below zero.
pub fn parse_unit_price(input: &str) -> Result<Decimal, PriceError> {
    let normalized = input.trim().replace(',', ".");
    let amount =
        Decimal::from_str(&normalized).map_err(|_| PriceError::Invalid(input.to_string()))?;
    ensure_non_negative(amount)
}

/// Format a decimal amount with two fraction digits and grouped thousands.
fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(NBSP);
        }
        grouped.push(*digit);
    }

    if negative {
        format!("-{grouped},{frac_part}")
    } else {
        format!("{grouped},{frac_part}")
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    RUB,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Currency symbol used in formatted prices.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::RUB => "₽",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RUB => "RUB",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }
}
