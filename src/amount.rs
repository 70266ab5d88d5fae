//! Numeric parsing for form input and loosely typed store values.
//!
//! Anything that turns text or an untyped JSON value into a number goes
//! through here, so the "absent means zero" rule is visible in one place
//! instead of happening by accident at each call site.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parses user-entered numeric text.
///
/// Thousands separators (`,`) are stripped and surrounding whitespace is
/// ignored. Empty, unparseable, infinite and NaN input yields `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Total version of [`parse_number`]: anything that is not a finite number
/// counts as zero.
pub fn parse_amount_or_zero(text: &str) -> f64 {
    amount_or_zero(parse_number(text))
}

/// Zero for absent or non-finite values, the value itself otherwise.
pub fn amount_or_zero(value: Option<f64>) -> f64 {
    value.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Interprets an arbitrary JSON value as a number.
pub fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Serde helper for `Option<f64>` fields that may arrive as numbers,
/// numeric strings, `null` or garbage. Never fails.
pub fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}
