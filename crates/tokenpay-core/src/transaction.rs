//! # Transaction Requests and Outcomes
//!
//! Wire shapes of the four money-movement endpoints. Shared by the SDK
//! client and the sandbox backend.
//!
//! Business declines are not errors here: every endpoint answers with a
//! `{success, transaction?, error?}` envelope and the SDK returns it
//! verbatim, so checkout code branches on `success` instead of catching
//! exceptions. Only malformed requests and transport problems surface
//! as [`PaymentError`].
//!
//! [`PaymentError`]: crate::error::PaymentError

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::{PaymentError, PaymentResult};
use crate::token::{BillingDetails, PaymentToken};

/// Default currency applied when a request does not name one
pub const DEFAULT_CURRENCY: &str = "USD";

// ===== Requests =====

/// Caller-facing charge/authorize request.
///
/// `token` and `amount` are required; everything else defaults when the
/// body is built (`currency` to `USD`, the string fields to empty,
/// `billing` to `{}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeRequest {
    pub token: String,
    pub descriptor: Option<String>,
    pub amount: Amount,
    pub currency: Option<String>,
    pub invoice_number: Option<String>,
    pub description: Option<String>,
    pub billing: Option<BillingDetails>,
}

impl ChargeRequest {
    /// Charge request from a bare token string
    pub fn new(token: impl Into<String>, amount: Amount) -> Self {
        Self {
            token: token.into(),
            descriptor: None,
            amount,
            currency: None,
            invoice_number: None,
            description: None,
            billing: None,
        }
    }

    /// Charge request from a tokenizer result, carrying both the token
    /// and its descriptor through unchanged
    pub fn from_token(token: &PaymentToken, amount: Amount) -> Self {
        Self {
            token: token.token.clone(),
            descriptor: Some(token.descriptor.clone()),
            amount,
            currency: None,
            invoice_number: None,
            description: None,
            billing: None,
        }
    }

    /// Builder: override the descriptor
    pub fn with_descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    /// Builder: ISO 4217 currency code
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Builder: merchant invoice number
    pub fn with_invoice_number(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = Some(invoice_number.into());
        self
    }

    /// Builder: free-form order description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: cardholder billing details
    pub fn with_billing(mut self, billing: BillingDetails) -> Self {
        self.billing = Some(billing);
        self
    }

    /// Validate and apply defaults, producing the exact wire body
    pub fn into_body(self) -> PaymentResult<ChargeBody> {
        if self.token.is_empty() {
            return Err(PaymentError::Validation(
                "A payment token is required".to_string(),
            ));
        }
        Ok(ChargeBody {
            token: self.token,
            descriptor: self.descriptor.unwrap_or_default(),
            amount: self.amount,
            currency: self.currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            invoice_number: self.invoice_number.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            billing: self.billing.unwrap_or_default(),
        })
    }
}

/// Wire body of `POST /payment/charge` and `POST /payment/authorize`.
///
/// Every key is always present; the backend contract has no optional
/// fields here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBody {
    pub token: String,
    pub descriptor: String,
    pub amount: Amount,
    pub currency: String,
    pub invoice_number: String,
    pub description: String,
    pub billing: BillingDetails,
}

/// Wire body of `POST /payment/capture`.
///
/// `amount` is omitted from the serialized body entirely when absent;
/// the backend then captures the full authorized amount. Any upper
/// bound on a partial amount is the backend's call, not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

impl CaptureRequest {
    /// Capture the full authorized amount
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount: None,
        }
    }

    /// Builder: capture a partial amount
    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Check the request names a transaction
    pub fn validate(&self) -> PaymentResult<()> {
        if self.transaction_id.is_empty() {
            return Err(PaymentError::Validation(
                "A transaction id is required to capture".to_string(),
            ));
        }
        Ok(())
    }
}

/// Wire body of `POST /payment/void`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidRequest {
    pub transaction_id: String,
}

impl VoidRequest {
    /// Void the hold on a transaction
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
        }
    }

    /// Check the request names a transaction
    pub fn validate(&self) -> PaymentResult<()> {
        if self.transaction_id.is_empty() {
            return Err(PaymentError::Validation(
                "A transaction id is required to void".to_string(),
            ));
        }
        Ok(())
    }
}

// ===== Outcomes =====

/// Transaction status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Authorized,
    Captured,
    Voided,
    Charged,
    Failed,
}

/// A transaction record as the backend reports it.
///
/// `transaction_id` is the sole handle for follow-up capture/void
/// calls; callers persist it themselves, the SDK does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

/// Business failure reported inside an outcome envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Response envelope of charge, capture and void.
///
/// `success: false` with an `error` is a normal business outcome
/// (a decline), handed back to the caller as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TransactionError>,
}

impl TransactionOutcome {
    /// Successful outcome wrapping a transaction
    pub fn ok(transaction: Transaction) -> Self {
        Self {
            success: true,
            transaction: Some(transaction),
            error: None,
        }
    }

    /// Declined outcome wrapping a business error
    pub fn declined(message: impl Into<String>, code: Option<String>) -> Self {
        Self {
            success: false,
            transaction: None,
            error: Some(TransactionError {
                message: message.into(),
                code,
            }),
        }
    }

    /// The transaction id, when the operation produced one
    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction.as_ref().map(|t| t.transaction_id.as_str())
    }
}

/// Response envelope of authorize; the held transaction arrives under
/// the `authorization` key instead of `transaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Transaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TransactionError>,
}

impl From<AuthorizeEnvelope> for TransactionOutcome {
    fn from(envelope: AuthorizeEnvelope) -> Self {
        Self {
            success: envelope.success,
            transaction: envelope.authorization,
            error: envelope.error,
        }
    }
}

impl From<TransactionOutcome> for AuthorizeEnvelope {
    fn from(outcome: TransactionOutcome) -> Self {
        Self {
            success: outcome.success,
            authorization: outcome.transaction,
            error: outcome.error,
        }
    }
}
