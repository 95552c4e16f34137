//! Price coercion and display.
//!
//! The backend is loose about monetary fields: the same field may arrive as a
//! JSON number, a numeric string, `null`, or be missing entirely. Everything
//! that reads a price goes through [`to_number`], which yields a finite
//! [`Decimal`] or `None`. There is no NaN in this crate.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Coerce a loosely typed JSON value into a finite decimal.
///
/// - numbers are used as-is,
/// - strings are trimmed and parsed (plain or scientific notation),
/// - anything else, including unparseable strings, is absent.
///
/// Finite values outside what a [`Decimal`] can hold (magnitude above
/// `Decimal::MAX`, about 7.9e28) are absent too, whether they arrive as a
/// number or a string. No real price gets near that bound.
///
/// # Examples
///
/// ```
/// use habaluna_core::to_number;
/// use rust_decimal::Decimal;
/// use serde_json::json;
///
/// assert_eq!(to_number(&json!("12.50")), Some(Decimal::new(125, 1)));
/// assert_eq!(to_number(&json!(null)), None);
/// assert_eq!(to_number(&json!("abc")), None);
/// assert_eq!(to_number(&json!(f64::NAN)), None);
/// ```
#[must_use]
pub fn to_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

/// Coerce a float into a decimal, treating NaN and infinities as absent.
#[must_use]
pub fn from_float(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::try_from(value).ok()
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Serde adapter for optional price fields (`#[serde(deserialize_with = ...)]`).
///
/// Missing fields need `#[serde(default)]` alongside this.
///
/// # Errors
///
/// Only fails if the input is not valid JSON; unparseable values become `None`.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(to_number))
}

/// Serde adapter for totals: like [`lenient`] but absent becomes zero.
///
/// # Errors
///
/// Only fails if the input is not valid JSON.
pub fn lenient_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    lenient(deserializer).map(Option::unwrap_or_default)
}

/// Currencies the storefront prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US dollar, the `priceUSD` field.
    #[default]
    Usd,
    /// Cuban peso (moneda nacional), the `priceMNs` field.
    Cup,
}

impl Currency {
    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Cup => "CUP",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Cup => "₱",
        }
    }

    /// Format an amount for display, e.g. `$19.99` or `₱4500.00`.
    ///
    /// Absent amounts render as `-`.
    #[must_use]
    pub fn format(self, amount: Option<Decimal>) -> String {
        let Some(amount) = amount else {
            return "-".to_string();
        };
        match self {
            Self::Usd => format!("{}{:.2}", self.symbol(), amount.round_dp(2)),
            Self::Cup => format!("{}{:.2}", self.symbol(), amount.round_dp(2)),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unsupported currency code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported currency: {0}")]
pub struct ParseCurrencyError(String);

impl FromStr for Currency {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "CUP" | "MN" | "MNS" => Ok(Self::Cup),
            _ => Err(ParseCurrencyError(s.to_string())),
        }
    }
}
