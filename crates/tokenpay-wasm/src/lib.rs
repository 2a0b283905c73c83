//! # tokenpay-wasm
//!
//! WebAssembly bindings for the tokenpay SDK's pure validation helpers.
//!
//! This crate provides WASM-compatible functions for:
//! - Validating card fields in a checkout form before tokenization
//! - Amount validation and display formatting
//! - Expiration date parsing for split month/year selects
//!
//! Validation here is a usability layer only; the processor re-checks
//! everything during tokenization, and raw card fields never leave the
//! browser except through the processor's own runtime.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { validate_card, format_amount } from 'tokenpay-wasm';
//!
//! await init();
//!
//! const report = validate_card({
//!   number: '4111 1111 1111 1111',
//!   exp_date: '12/30',
//!   cvv: '123',
//! });
//!
//! if (!report.valid) {
//!   showFieldErrors(report.issues);
//! }
//!
//! console.log('Total:', format_amount('49.9')); // "$49.90"
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use serde::{Deserialize, Serialize};
use tokenpay_core::card::{normalize_card_number, normalize_cvv, normalize_expiry};
use tokenpay_core::Amount;
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// One field-level validation failure
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Which form field failed: `number`, `exp_date` or `cvv`
    pub field: String,
    /// Message written for display next to the field
    pub message: String,
}

/// Structured validation report for a whole card form
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<FieldIssue>,
}

#[derive(Debug, Deserialize)]
struct CardFieldsInput {
    number: String,
    exp_date: String,
    cvv: String,
}

/// Card fields captured from a checkout form.
///
/// Write-only by design: the raw number never crosses back to
/// JavaScript, only validation results and the masked form do.
#[wasm_bindgen]
pub struct WasmCardFields {
    number: String,
    exp_date: String,
    cvv: String,
}

#[wasm_bindgen]
impl WasmCardFields {
    #[wasm_bindgen(constructor)]
    pub fn new(number: String, exp_date: String, cvv: String) -> Self {
        Self {
            number,
            exp_date,
            cvv,
        }
    }

    /// Validate every field and report per-field issues
    #[wasm_bindgen]
    pub fn validate(&self) -> Result<JsValue, JsValue> {
        let report = build_report(&self.number, &self.exp_date, &self.cvv);
        serde_wasm_bindgen::to_value(&report).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// True when every field passes validation
    #[wasm_bindgen]
    pub fn is_valid(&self) -> bool {
        let report = build_report(&self.number, &self.exp_date, &self.cvv);
        report.valid
    }

    /// Masked number for display, e.g. `****1111`
    #[wasm_bindgen]
    pub fn masked_number(&self) -> String {
        match normalize_card_number(&self.number) {
            Ok(digits) => format!("****{}", &digits[digits.len() - 4..]),
            Err(_) => "****".to_string(),
        }
    }
}

/// Validate a `{ number, exp_date, cvv }` object and return a
/// structured report
#[wasm_bindgen]
pub fn validate_card(fields: JsValue) -> Result<JsValue, JsValue> {
    let fields: CardFieldsInput = serde_wasm_bindgen::from_value(fields)
        .map_err(|e| JsValue::from_str(&format!("Invalid card fields: {}", e)))?;

    let report = build_report(&fields.number, &fields.exp_date, &fields.cvv);
    serde_wasm_bindgen::to_value(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Check a card number: 13 to 19 digits after stripping spaces
#[wasm_bindgen]
pub fn validate_card_number(number: &str) -> bool {
    normalize_card_number(number).is_ok()
}

/// Check an expiration date in `MM/YY` or `MM/YYYY` form against the
/// current month
#[wasm_bindgen]
pub fn validate_expiry(exp_date: &str) -> bool {
    normalize_expiry(exp_date).is_ok()
}

/// Check a security code: 3 or 4 digits
#[wasm_bindgen]
pub fn validate_cvv(cvv: &str) -> bool {
    normalize_cvv(cvv).is_ok()
}

#[derive(Debug, Serialize)]
struct ExpiryParts {
    month: String,
    year: String,
    full_year: String,
}

/// Split a valid expiration date into `{ month, year, full_year }`
#[wasm_bindgen]
pub fn expiry_parts(exp_date: &str) -> Result<JsValue, JsValue> {
    let expiry = normalize_expiry(exp_date).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let parts = ExpiryParts {
        full_year: expiry.full_year(),
        month: expiry.month,
        year: expiry.year,
    };
    serde_wasm_bindgen::to_value(&parts).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Check an amount: a strictly positive decimal string
#[wasm_bindgen]
pub fn validate_amount(value: &str) -> bool {
    Amount::new(value).is_ok()
}

/// Format a USD amount for display, padding to two decimal places
#[wasm_bindgen]
pub fn format_amount(value: &str) -> Result<String, JsValue> {
    let amount = Amount::new(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(format!("${}", display_decimal(amount.as_str())))
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn build_report(number: &str, exp_date: &str, cvv: &str) -> ValidationReport {
    let mut issues = Vec::new();

    if let Err(e) = normalize_card_number(number) {
        issues.push(FieldIssue {
            field: "number".to_string(),
            message: e.to_string(),
        });
    }
    if let Err(e) = normalize_expiry(exp_date) {
        issues.push(FieldIssue {
            field: "exp_date".to_string(),
            message: e.to_string(),
        });
    }
    if let Err(e) = normalize_cvv(cvv) {
        issues.push(FieldIssue {
            field: "cvv".to_string(),
            message: e.to_string(),
        });
    }

    ValidationReport {
        valid: issues.is_empty(),
        issues,
    }
}

fn display_decimal(value: &str) -> String {
    match value.split_once('.') {
        None => format!("{value}.00"),
        Some((int, frac)) if frac.len() == 1 => format!("{int}.{frac}0"),
        Some(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_flags_each_bad_field() {
        let report = build_report("4111", "13/30", "12");
        assert!(!report.valid);
        let fields: Vec<_> = report.issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["number", "exp_date", "cvv"]);
    }

    #[test]
    fn test_report_accepts_a_valid_card() {
        let report = build_report("4111 1111 1111 1111", "12/99", "123");
        assert!(report.valid);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_expired_card_is_an_expiry_issue() {
        let report = build_report("4111 1111 1111 1111", "01/20", "123");
        assert!(!report.valid);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].field, "exp_date");
        assert!(report.issues[0].message.contains("expired"));
    }

    #[test]
    fn test_masked_number() {
        let fields = WasmCardFields::new(
            "4111 1111 1111 1111".to_string(),
            "12/99".to_string(),
            "123".to_string(),
        );
        assert_eq!(fields.masked_number(), "****1111");
        assert!(fields.is_valid());

        let bad = WasmCardFields::new("41".to_string(), "12/99".to_string(), "123".to_string());
        assert_eq!(bad.masked_number(), "****");
    }

    #[test]
    fn test_validate_card_number() {
        assert!(validate_card_number("4111 1111 1111 1111"));
        assert!(!validate_card_number("4111"));
        assert!(!validate_card_number("4111-1111-1111-1111"));
    }

    #[test]
    fn test_validate_cvv() {
        assert!(validate_cvv("123"));
        assert!(validate_cvv("1234"));
        assert!(!validate_cvv("12"));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("49.99"));
        assert!(validate_amount("100"));
        assert!(!validate_amount("-5.00"));
        assert!(!validate_amount("abc"));
    }

    #[test]
    fn test_display_decimal_pads_to_cents() {
        assert_eq!(display_decimal("49"), "49.00");
        assert_eq!(display_decimal("49.9"), "49.90");
        assert_eq!(display_decimal("49.99"), "49.99");
        assert_eq!(display_decimal("0.005"), "0.005");
    }
}
