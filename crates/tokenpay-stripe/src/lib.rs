//! # tokenpay-stripe
//!
//! Stripe Elements tokenization backend for the tokenpay SDK.
//!
//! Card fields live in a Stripe-hosted element; the SDK holds only an
//! opaque [`ElementRef`] and exchanges it for a payment method id. The
//! gateway consumes the uniform `{token, descriptor}` pair and never
//! learns which processor produced it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tokenpay_core::{CardInput, ElementRef};
//! use tokenpay_stripe::ElementsTokenizer;
//!
//! let tokenizer = ElementsTokenizer::from_processor_config(&config, &context)?;
//! tokenizer.load().await?;
//!
//! let token = tokenizer
//!     .tokenize(CardInput::Element(ElementRef::new("card-element")), None)
//!     .await?;
//! assert_eq!(token.descriptor, "stripe_payment_method");
//! ```
//!
//! [`ElementRef`]: tokenpay_core::ElementRef

pub mod client;
pub mod config;
pub mod tokenizer;

// Re-exports
pub use client::ElementsClient;
pub use config::{ElementsConfig, API_BASE_URL, DESCRIPTOR, SCRIPT_URL, SLUG};
pub use tokenizer::ElementsTokenizer;
