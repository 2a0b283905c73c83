//! # Card Validation
//!
//! Pure validation and normalization of raw card fields before they are
//! handed to a processor tokenizer. Only raw-field processors go through
//! this path; Elements-style processors validate server-side and accept
//! an opaque element reference instead.
//!
//! No I/O and no clock access, except that [`normalize_expiry`] and
//! [`CardDetails::validate`] read UTC "now" and delegate to `*_at`
//! variants that take the clock as an argument.

use chrono::{Datelike, Utc};
use thiserror::Error;

use crate::error::PaymentError;

/// Validation failures for raw card fields.
///
/// Messages are written for display next to a card form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CardError {
    /// Number is not 13-19 digits after stripping spaces
    #[error("Card number must be 13 to 19 digits")]
    InvalidNumber,

    /// Expiration date is not MM/YY or MM/YYYY
    #[error("Expiration date must be in MM/YY format")]
    InvalidExpiry,

    /// Month component outside 1-12
    #[error("Expiration month must be between 01 and 12")]
    InvalidMonth,

    /// Date is strictly before the current month
    #[error("The card has expired")]
    Expired,

    /// Security code is not 3 or 4 digits
    #[error("Security code must be 3 or 4 digits")]
    InvalidCvv,
}

impl From<CardError> for PaymentError {
    fn from(err: CardError) -> Self {
        PaymentError::Validation(err.to_string())
    }
}

/// Normalized expiration date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expiry {
    /// Zero-padded two-digit month, "01" through "12"
    pub month: String,
    /// Two-digit year, "00" through "99"
    pub year: String,
}

impl Expiry {
    /// Four-digit year for processors that want the long form
    pub fn full_year(&self) -> String {
        format!("20{}", self.year)
    }
}

/// Strip spaces from a card number and check its shape.
///
/// Returns the digits-only string. No checksum is applied here; the
/// processor performs its own account-range checks during tokenization.
pub fn normalize_card_number(raw: &str) -> Result<String, CardError> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CardError::InvalidNumber);
    }
    if !(13..=19).contains(&digits.len()) {
        return Err(CardError::InvalidNumber);
    }
    Ok(digits)
}

/// Parse and validate `MM/YY` or `MM/YYYY` against the current UTC month
pub fn normalize_expiry(raw: &str) -> Result<Expiry, CardError> {
    let now = Utc::now();
    normalize_expiry_at(raw, now.year(), now.month())
}

/// Clock-independent form of [`normalize_expiry`].
///
/// Expiry is checked at month granularity: a card expiring in the
/// current month is still accepted through the end of that month.
pub fn normalize_expiry_at(raw: &str, now_year: i32, now_month: u32) -> Result<Expiry, CardError> {
    let (month_part, year_part) = raw.trim().split_once('/').ok_or(CardError::InvalidExpiry)?;
    let month_part = month_part.trim();
    let year_part = year_part.trim();

    if month_part.is_empty()
        || month_part.len() > 2
        || !month_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(CardError::InvalidExpiry);
    }
    let month: u32 = month_part.parse().map_err(|_| CardError::InvalidExpiry)?;
    if !(1..=12).contains(&month) {
        return Err(CardError::InvalidMonth);
    }

    if !year_part.chars().all(|c| c.is_ascii_digit()) {
        return Err(CardError::InvalidExpiry);
    }
    let year: i32 = match year_part.len() {
        // Two-digit years expand into the 2000s
        2 => 2000 + year_part.parse::<i32>().map_err(|_| CardError::InvalidExpiry)?,
        4 => year_part.parse::<i32>().map_err(|_| CardError::InvalidExpiry)?,
        _ => return Err(CardError::InvalidExpiry),
    };

    if (year, month) < (now_year, now_month) {
        return Err(CardError::Expired);
    }

    Ok(Expiry {
        month: format!("{month:02}"),
        year: format!("{:02}", year % 100),
    })
}

/// Validate a card security code: 3 or 4 digits
pub fn normalize_cvv(raw: &str) -> Result<String, CardError> {
    let cvv = raw.trim();
    if !(cvv.len() == 3 || cvv.len() == 4) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(CardError::InvalidCvv);
    }
    Ok(cvv.to_string())
}

/// Raw card fields captured from a checkout form.
///
/// Ephemeral by design: constructed for a single tokenize call and
/// dropped immediately after. Never serialized, and `Debug` masks
/// everything but the last four digits so the value cannot leak
/// through logs.
#[derive(Clone)]
pub struct CardDetails {
    /// Card number, spaces allowed
    pub number: String,
    /// Expiration date as `MM/YY` or `MM/YYYY`
    pub exp_date: String,
    /// Security code
    pub cvv: String,
}

impl CardDetails {
    /// Create raw card details from form fields
    pub fn new(
        number: impl Into<String>,
        exp_date: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            exp_date: exp_date.into(),
            cvv: cvv.into(),
        }
    }

    /// Run full validation, producing the normalized fields a processor
    /// dispatch request needs
    pub fn validate(&self) -> Result<ValidatedCard, CardError> {
        let now = Utc::now();
        self.validate_at(now.year(), now.month())
    }

    /// Clock-independent form of [`CardDetails::validate`]
    pub fn validate_at(&self, now_year: i32, now_month: u32) -> Result<ValidatedCard, CardError> {
        let number = normalize_card_number(&self.number)?;
        let expiry = normalize_expiry_at(&self.exp_date, now_year, now_month)?;
        let cvv = normalize_cvv(&self.cvv)?;
        Ok(ValidatedCard {
            number,
            expiry,
            cvv,
        })
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &mask_pan(&self.number))
            .field("exp_date", &"**/**")
            .field("cvv", &"***")
            .finish()
    }
}

/// Card fields after normalization, ready for a dispatch request
#[derive(Clone)]
pub struct ValidatedCard {
    /// Digits-only card number
    pub number: String,
    /// Normalized expiration
    pub expiry: Expiry,
    /// Digits-only security code
    pub cvv: String,
}

impl std::fmt::Debug for ValidatedCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedCard")
            .field("number", &mask_pan(&self.number))
            .field("expiry", &"**/**")
            .field("cvv", &"***")
            .finish()
    }
}

fn mask_pan(number: &str) -> String {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() <= 4 {
        return "****".to_string();
    }
    format!("****{}", &digits[digits.len() - 4..])
}
