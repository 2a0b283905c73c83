//! # tokenpay-client
//!
//! Storefront payment SDK for tokenpay-rs.
//!
//! One [`PaymentGateway`] per merchant backend drives the whole flow:
//!
//! 1. **load** - ask the backend which processor is active and fetch
//!    that processor's client runtime (exactly once per process)
//! 2. **tokenize** - exchange card input for a single-use token; raw
//!    card data never touches the merchant backend
//! 3. **charge / authorize + capture / void** - move money through the
//!    backend using only the token and later the transaction id
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tokenpay_client::{
//!     Amount, CardDetails, CardInput, ChargeRequest, GatewayConfig, PaymentGateway,
//! };
//!
//! // Create gateway from environment (TOKENPAY_API_URL, TOKENPAY_API_KEY)
//! let gateway = PaymentGateway::from_env()?;
//!
//! // Load the active processor's client runtime
//! let config = gateway.load().await?;
//! println!("Paying through {}", config.processor.name);
//!
//! // Tokenize and charge
//! let card = CardDetails::new("4111 1111 1111 1111", "12/30", "123");
//! let token = gateway.tokenize(CardInput::Raw(card), None).await?;
//!
//! let request = ChargeRequest::from_token(&token, Amount::new("49.99")?);
//! let outcome = gateway.charge(request).await?;
//! if outcome.success {
//!     println!("Paid: {:?}", outcome.transaction_id());
//! }
//! ```
//!
//! ## Two-step payments
//!
//! ```rust,ignore
//! use tokenpay_client::{Amount, CaptureRequest, ChargeRequest, VoidRequest};
//!
//! let auth = gateway
//!     .authorize(ChargeRequest::from_token(&token, Amount::new("50.00")?))
//!     .await?;
//! let id = auth.transaction_id().unwrap().to_string();
//!
//! // Later: capture part of the hold, or release it
//! gateway.capture(CaptureRequest::new(&id).with_amount(Amount::new("10.00")?)).await?;
//! // ...or: gateway.void(VoidRequest::new(&id)).await?;
//! ```

pub mod config;
pub mod gateway;
pub mod http;

// Re-exports
pub use config::{GatewayConfig, RuntimeContext};
pub use gateway::{GatewayBuilder, GatewayStatus, PaymentGateway};
pub use http::{ApiClient, HttpScriptLoader};

// Core types a storefront touches directly
pub use tokenpay_core::{
    Amount, BillingDetails, CaptureRequest, CardDetails, CardInput, ChargeRequest, ElementRef,
    PaymentError, PaymentResult, PaymentToken, ProcessorConfig, ProcessorInfo,
    TransactionOutcome, VoidRequest,
};
