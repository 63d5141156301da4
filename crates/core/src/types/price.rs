//! Type-safe price representation using decimal arithmetic.
//!
//! Shopify returns money as `{ amount: "19.90", currencyCode: "USD" }`. The
//! amount is kept as a [`Decimal`] so display and comparison never go
//! through floating point.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors building a [`Price`] from API strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),
}

/// A price with currency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code (e.g., "USD").
    pub currency_code: String,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: String) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Parse a price from the decimal string and currency code Shopify returns.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the amount is not a decimal or the currency
    /// code is not three ASCII letters.
    pub fn parse(amount: &str, currency_code: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(amount.trim())
            .map_err(|_| PriceError::InvalidAmount(amount.to_string()))?;

        let code = currency_code.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(PriceError::InvalidCurrency(currency_code.to_string()));
        }

        Ok(Self::new(amount, code))
    }

    /// Narrow currency symbol, if one is known for the currency.
    #[must_use]
    pub fn symbol(&self) -> Option<&'static str> {
        match self.currency_code.as_str() {
            "USD" | "CAD" | "AUD" | "NZD" | "SGD" | "HKD" | "MXN" => Some("$"),
            "EUR" => Some("€"),
            "GBP" => Some("£"),
            "JPY" | "CNY" => Some("¥"),
            _ => None,
        }
    }

    /// Format for display with two decimals (e.g., "$19.90").
    #[must_use]
    pub fn display(&self) -> String {
        self.format(self.amount.round_dp(2), true)
    }

    /// Format for display without trailing zeros (e.g., "$20" or "$19.9").
    #[must_use]
    pub fn display_compact(&self) -> String {
        self.format(self.amount.round_dp(2).normalize(), false)
    }

    fn format(&self, amount: Decimal, fixed: bool) -> String {
        let number = if fixed {
            format!("{amount:.2}")
        } else {
            amount.to_string()
        };
        self.symbol().map_or_else(
            || format!("{number} {}", self.currency_code),
            |symbol| format!("{symbol}{number}"),
        )
    }

    /// Whether `compare_at` marks this price as a markdown.
    ///
    /// Only true for a strictly higher compare-at price in the same currency.
    #[must_use]
    pub fn is_discounted_from(&self, compare_at: &Self) -> bool {
        self.currency_code == compare_at.currency_code && compare_at.amount > self.amount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let price = Price::parse("19.9", "usd").unwrap();
        assert_eq!(price.currency_code, "USD");
        assert_eq!(price.display(), "$19.90");
        assert_eq!(price.display_compact(), "$19.9");
    }

    #[test]
    fn test_display_compact_drops_zeros() {
        let price = Price::parse("20.00", "EUR").unwrap();
        assert_eq!(price.display_compact(), "€20");
    }

    #[test]
    fn test_display_unknown_currency() {
        let price = Price::parse("1500", "KRW").unwrap();
        assert_eq!(price.display(), "1500.00 KRW");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Price::parse("abc", "USD"),
            Err(PriceError::InvalidAmount(_))
        ));
        assert!(matches!(
            Price::parse("1.00", "US"),
            Err(PriceError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_is_discounted_from() {
        let price = Price::parse("15.00", "USD").unwrap();
        let higher = Price::parse("25.00", "USD").unwrap();
        let same = Price::parse("15.00", "USD").unwrap();
        let other_currency = Price::parse("25.00", "CAD").unwrap();

        assert!(price.is_discounted_from(&higher));
        assert!(!price.is_discounted_from(&same));
        assert!(!price.is_discounted_from(&other_currency));
    }
}
