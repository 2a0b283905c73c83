//! # tokenpay-core
//!
//! Core types and traits for the tokenpay payment SDK.
//!
//! This crate provides:
//! - `CardTokenizer` trait and `TokenizerRegistry` for pluggable
//!   tokenization backends
//! - `ScriptRegistry` for exactly-once loading of processor client
//!   runtimes
//! - Card validation (`CardDetails`, `normalize_*`) and `Amount`
//! - Wire types for the backend payment contract (`ChargeBody`,
//!   `TransactionOutcome`, `ProcessorConfig`)
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use tokenpay_core::{Amount, CardDetails, CardInput, ChargeRequest};
//!
//! // Validate card fields before tokenizing
//! let card = CardDetails::new("4111 1111 1111 1111", "12/30", "123");
//! let token = tokenizer.tokenize(CardInput::Raw(card), None).await?;
//!
//! // Charge with the minted token
//! let request = ChargeRequest::from_token(&token, Amount::new("49.99")?);
//! let outcome = gateway.charge(request).await?;
//! assert!(outcome.success);
//! ```

pub mod amount;
pub mod card;
pub mod config;
pub mod error;
pub mod loader;
pub mod token;
pub mod tokenizer;
pub mod transaction;

// Re-exports for convenience
pub use amount::Amount;
pub use card::{CardDetails, CardError, Expiry, ValidatedCard};
pub use config::{
    ClientConfigResponse, ProcessorConfig, ProcessorEnvironment, ProcessorInfo, ProcessorResponse,
};
pub use error::{PaymentError, PaymentResult};
pub use loader::{ScriptLoader, ScriptRegistry, ScriptStatus};
pub use token::{Address, BillingDetails, CardInput, ElementRef, PaymentToken};
pub use tokenizer::{
    BoxedTokenizer, CardTokenizer, TokenizerContext, TokenizerFactory, TokenizerRegistry,
};
pub use transaction::{
    AuthorizeEnvelope, CaptureRequest, ChargeBody, ChargeRequest, Transaction, TransactionError,
    TransactionOutcome, TransactionStatus, VoidRequest,
};
