//! # Monetary Amounts
//!
//! Amounts travel as validated decimal strings, never floats, so the
//! value the caller writes is the byte-for-byte value the backend sees.
//! `"99.99"` stays `"99.99"`; no drift, no scientific notation.

use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, PaymentResult};

/// A strictly positive decimal amount, serialized as a plain string.
///
/// Accepted shape: one or more digits, optionally followed by a decimal
/// point and one or more digits (`100`, `0.5`, `49.99`). Rejected:
/// signs, exponents, empty integer or fraction parts, and zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(String);

impl Amount {
    /// Validate and wrap a decimal string
    pub fn new(value: impl Into<String>) -> PaymentResult<Self> {
        let value = value.into();
        if !is_positive_decimal(&value) {
            return Err(PaymentError::Validation(format!(
                "Amount must be a positive decimal string, got {value:?}"
            )));
        }
        Ok(Self(value))
    }

    /// Build from the smallest currency unit (cents for two-decimal
    /// currencies), using integer math only
    pub fn from_minor_units(units: u64, decimal_places: u8) -> PaymentResult<Self> {
        let rendered = if decimal_places == 0 {
            units.to_string()
        } else {
            let divisor = 10u64.pow(u32::from(decimal_places));
            format!(
                "{}.{:0width$}",
                units / divisor,
                units % divisor,
                width = decimal_places as usize
            )
        };
        Self::new(rendered)
    }

    /// The exact string sent on the wire
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric comparison of the decimal values.
    ///
    /// Distinct renderings of the same value (`10`, `10.0`, `10.00`)
    /// compare equal here even though `==` on `Amount` is textual.
    pub fn value_cmp(&self, other: &Self) -> std::cmp::Ordering {
        let (left_int, left_frac) = split_decimal(&self.0);
        let (right_int, right_frac) = split_decimal(&other.0);

        let left_int = left_int.trim_start_matches('0');
        let right_int = right_int.trim_start_matches('0');
        left_int
            .len()
            .cmp(&right_int.len())
            .then_with(|| left_int.cmp(right_int))
            // Digit strings compare position-by-position, which is
            // exactly fractional ordering once trailing zeros are gone
            .then_with(|| {
                left_frac
                    .trim_end_matches('0')
                    .cmp(right_frac.trim_end_matches('0'))
            })
    }

    /// True when this amount is numerically larger than `other`
    pub fn exceeds(&self, other: &Self) -> bool {
        self.value_cmp(other) == std::cmp::Ordering::Greater
    }
}

fn split_decimal(value: &str) -> (&str, &str) {
    match value.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (value, ""),
    }
}

impl TryFrom<String> for Amount {
    type Error = PaymentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::str::FromStr for Amount {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::new(s)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_positive_decimal(value: &str) -> bool {
    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (value, None),
    };
    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if let Some(frac) = frac_part {
        if frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }
    // Strictly positive: at least one non-zero digit somewhere
    value.chars().any(|c| c.is_ascii_digit() && c != '0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_decimals() {
        for input in ["99.99", "100", "0.5", "1", "0.01", "12345.6789"] {
            let amount = Amount::new(input).unwrap();
            assert_eq!(amount.as_str(), input);
        }
    }

    #[test]
    fn test_rejects_zero_and_negatives() {
        for input in ["0", "0.0", "0.00", "000", "-5", "-0.5"] {
            assert!(Amount::new(input).is_err(), "expected rejection: {input}");
        }
    }

    #[test]
    fn test_rejects_malformed() {
        for input in ["", " ", "abc", "1e3", "1.2.3", ".5", "5.", "1,000", "+1", "NaN"] {
            assert!(Amount::new(input).is_err(), "expected rejection: {input}");
        }
    }

    #[test]
    fn test_serializes_as_bare_string() {
        let amount = Amount::new("49.99").unwrap();
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"49.99\"");
    }

    #[test]
    fn test_deserialization_validates() {
        let amount: Amount = serde_json::from_str("\"10.00\"").unwrap();
        assert_eq!(amount.as_str(), "10.00");
        assert!(serde_json::from_str::<Amount>("\"-1\"").is_err());
        assert!(serde_json::from_str::<Amount>("\"1e3\"").is_err());
    }

    #[test]
    fn test_from_minor_units() {
        assert_eq!(Amount::from_minor_units(1099, 2).unwrap().as_str(), "10.99");
        assert_eq!(Amount::from_minor_units(50, 2).unwrap().as_str(), "0.50");
        assert_eq!(Amount::from_minor_units(1000, 0).unwrap().as_str(), "1000");
        assert!(Amount::from_minor_units(0, 2).is_err());
    }

    #[test]
    fn test_value_cmp_ignores_rendering() {
        use std::cmp::Ordering;

        let cmp = |a: &str, b: &str| Amount::new(a).unwrap().value_cmp(&Amount::new(b).unwrap());
        assert_eq!(cmp("10", "10.00"), Ordering::Equal);
        assert_eq!(cmp("0.5", "0.50"), Ordering::Equal);
        assert_eq!(cmp("2", "10"), Ordering::Less);
        assert_eq!(cmp("10.01", "10.005"), Ordering::Greater);
        assert_eq!(cmp("10.12", "10.125"), Ordering::Less);
        assert_eq!(cmp("100", "99.99"), Ordering::Greater);
    }

    #[test]
    fn test_exceeds() {
        let authorized = Amount::new("50.00").unwrap();
        assert!(!Amount::new("50.00").unwrap().exceeds(&authorized));
        assert!(!Amount::new("10.00").unwrap().exceeds(&authorized));
        assert!(Amount::new("50.01").unwrap().exceeds(&authorized));
    }
}
