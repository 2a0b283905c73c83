//! # Payment Error Types
//!
//! Typed error handling for the tokenpay SDK. All fallible operations
//! return `Result<T, PaymentError>`.
//!
//! Processor declines during charge/authorize/capture/void are *not*
//! errors: the backend reports them inside [`TransactionOutcome`] with
//! `success: false` and the SDK hands that envelope back verbatim. The
//! variants here cover everything that prevents an operation from
//! producing an outcome at all.
//!
//! [`TransactionOutcome`]: crate::transaction::TransactionOutcome

use thiserror::Error;

/// Core error type for all SDK operations.
///
/// `Clone` so a single failure can be fanned out to every caller awaiting
/// the same in-flight bootstrap or tokenization.
#[derive(Debug, Clone, Error)]
pub enum PaymentError {
    /// Card data failed local validation before any network call
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Processor client runtime failed to fetch or initialize
    #[error("Script load failed for {url}: {message}")]
    ScriptLoad { url: String, message: String },

    /// Tokenization was requested before the processor runtime loaded
    #[error("Processor runtime not loaded; call load() first")]
    NotLoaded,

    /// Operation requires a client runtime context
    #[error("Operation unavailable in this runtime context: {0}")]
    Environment(String),

    /// Backend reports no active processor for this merchant
    #[error("No payment processor is configured")]
    NoProcessorConfigured,

    /// Backend named a processor this SDK has no tokenizer for
    #[error("Unsupported payment processor: {slug}")]
    UnsupportedProcessor { slug: String },

    /// Processor rejected the tokenization request
    #[error("Tokenization failed: {message}")]
    Tokenize {
        message: String,
        /// Processor's own result code, preserved verbatim (e.g. `E_WC_05`)
        code: Option<String>,
        /// Processor's error classification, where it reports one
        error_type: Option<String>,
    },

    /// Transport-level failure reaching the backend or processor
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered outside the 2xx range
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Request or response body could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid or incomplete SDK configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PaymentError {
    /// Returns true if retrying the same call might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::Network(_)
                | PaymentError::ScriptLoad { .. }
                | PaymentError::Api { status: 500..=599, .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Validation(_) => 400,
            PaymentError::ScriptLoad { .. } => 502,
            PaymentError::NotLoaded => 409,
            PaymentError::Environment(_) => 409,
            PaymentError::NoProcessorConfigured => 404,
            PaymentError::UnsupportedProcessor { .. } => 501,
            PaymentError::Tokenize { .. } => 402,
            PaymentError::Network(_) => 503,
            PaymentError::Api { status, .. } => *status,
            PaymentError::Serialization(_) => 500,
            PaymentError::Configuration(_) => 500,
        }
    }

    /// Shorthand for a tokenization failure with no processor metadata
    pub fn tokenize(message: impl Into<String>) -> Self {
        PaymentError::Tokenize {
            message: message.into(),
            code: None,
            error_type: None,
        }
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(err: serde_json::Error) -> Self {
        PaymentError::Serialization(err.to_string())
    }
}

/// Result type alias for SDK operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PaymentError::Network("timeout".into()).is_retryable());
        assert!(PaymentError::ScriptLoad {
            url: "https://js.example.com/v1/accept.js".into(),
            message: "connection reset".into()
        }
        .is_retryable());
        assert!(PaymentError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_retryable());
        assert!(!PaymentError::Api {
            status: 401,
            message: "bad key".into()
        }
        .is_retryable());
        assert!(!PaymentError::Validation("bad pan".into()).is_retryable());
        assert!(!PaymentError::NotLoaded.is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PaymentError::Validation("x".into()).status_code(), 400);
        assert_eq!(PaymentError::NotLoaded.status_code(), 409);
        assert_eq!(PaymentError::NoProcessorConfigured.status_code(), 404);
        assert_eq!(
            PaymentError::UnsupportedProcessor { slug: "acme".into() }.status_code(),
            501
        );
        assert_eq!(
            PaymentError::Api {
                status: 418,
                message: "teapot".into()
            }
            .status_code(),
            418
        );
    }

    #[test]
    fn test_tokenize_preserves_processor_code() {
        let err = PaymentError::Tokenize {
            message: "The credit card has expired.".into(),
            code: Some("E_WC_08".into()),
            error_type: None,
        };
        match &err {
            PaymentError::Tokenize { code, .. } => {
                assert_eq!(code.as_deref(), Some("E_WC_08"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn test_errors_clone_for_shared_futures() {
        let err = PaymentError::ScriptLoad {
            url: "https://js.example.com/v1/accept.js".into(),
            message: "404".into(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
