//! Type-safe price representation using decimal arithmetic.
//!
//! Store forms accept amounts the way people type them (`1,250.50`,
//! `  99 `), and list pages print them back with grouping. Both directions
//! live here so the admin crate never formats money by hand.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a money amount.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// The input was empty.
    #[error("amount is required")]
    Empty,
    /// The input was not a number.
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    /// The amount is below zero.
    #[error("amount cannot be negative")]
    Negative,
}

/// Parse a user-entered amount.
///
/// Commas and underscores are treated as thousands separators and dropped.
///
/// # Errors
///
/// Returns [`MoneyError`] for empty, non-numeric or negative input.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use storedesk_core::parse_amount;
///
/// assert_eq!(parse_amount("1,250.50").unwrap(), Decimal::new(125_050, 2));
/// assert!(parse_amount("-3").is_err());
/// ```
pub fn parse_amount(input: &str) -> Result<Decimal, MoneyError> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();

    if cleaned.is_empty() {
        return Err(MoneyError::Empty);
    }

    let amount =
        Decimal::from_str(&cleaned).map_err(|_| MoneyError::Invalid(input.trim().to_string()))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative);
    }

    Ok(amount.normalize())
}

/// Format a decimal with thousands separators and a fixed number of fraction digits.
///
/// ```
/// use rust_decimal::Decimal;
/// use storedesk_core::format_grouped;
///
/// assert_eq!(format_grouped(Decimal::new(12_345_678, 1), 2), "1,234,567.80");
/// assert_eq!(format_grouped(Decimal::new(1_500, 0), 0), "1,500");
/// ```
#[must_use]
pub fn format_grouped(amount: Decimal, minor_digits: u32) -> String {
    let rounded =
        amount.round_dp_with_strategy(minor_digits, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);

    if minor_digits > 0 {
        let width = minor_digits as usize;
        out.push('.');
        out.push_str(frac_part);
        for _ in frac_part.len()..width {
            out.push('0');
        }
    }

    out
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
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

    /// Format for display (e.g., `$1,250.50`, `₫150,000`).
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{}{}",
            self.currency_code.symbol(),
            format_grouped(self.amount, self.currency_code.minor_digits())
        )
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes supported by store settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    VND,
}

impl CurrencyCode {
    /// All supported currencies, in the order shown in the settings form.
    pub const ALL: [Self; 4] = [Self::USD, Self::EUR, Self::GBP, Self::VND];

    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::VND => "₫",
        }
    }

    /// Number of fraction digits shown for this currency.
    #[must_use]
    pub const fn minor_digits(self) -> u32 {
        match self {
            Self::VND => 0,
            Self::USD | Self::EUR | Self::GBP => 2,
        }
    }

    /// ISO code string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::VND => "VND",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unsupported currency: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_with_separators() {
        assert_eq!(parse_amount("1,000,000").unwrap(), Decimal::new(1_000_000, 0));
        assert_eq!(parse_amount(" 12.5 ").unwrap(), Decimal::new(125, 1));
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_errors() {
        assert_eq!(parse_amount(""), Err(MoneyError::Empty));
        assert_eq!(parse_amount(" , "), Err(MoneyError::Empty));
        assert_eq!(parse_amount("-1"), Err(MoneyError::Negative));
        assert!(matches!(parse_amount("12abc"), Err(MoneyError::Invalid(_))));
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(Decimal::ZERO, 2), "0.00");
        assert_eq!(format_grouped(Decimal::new(999, 0), 2), "999.00");
        assert_eq!(format_grouped(Decimal::new(1000, 0), 0), "1,000");
        assert_eq!(format_grouped(Decimal::new(123_456_789, 2), 2), "1,234,567.89");
        assert_eq!(format_grouped(Decimal::new(-25_005, 3), 2), "-25.01");
    }

    #[test]
    fn test_price_display_per_currency() {
        let usd = Price::new(Decimal::new(125_050, 2), CurrencyCode::USD);
        assert_eq!(usd.display(), "$1,250.50");

        let vnd = Price::new(Decimal::new(150_000, 0), CurrencyCode::VND);
        assert_eq!(vnd.to_string(), "₫150,000");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("vnd".parse::<CurrencyCode>().unwrap(), CurrencyCode::VND);
        assert!("BTC".parse::<CurrencyCode>().is_err());
    }
}
