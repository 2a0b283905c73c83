//! # tokenpay-authnet
//!
//! Authorize.Net Accept tokenization backend for the tokenpay SDK.
//!
//! Raw card fields are validated locally, dispatched to the Accept
//! secure-payment-container API, and returned as the uniform
//! `{token, descriptor}` pair the payment gateway consumes. Processor
//! result codes are translated into plain-language messages; the raw
//! code rides along for diagnostics.

pub mod client;
pub mod config;
pub mod tokenizer;

// Re-exports for convenience
pub use client::{user_message, AcceptClient};
pub use config::{
    AcceptConfig, DESCRIPTOR, LIVE_API_BASE_URL, LIVE_SCRIPT_URL, SLUG, TEST_API_BASE_URL,
    TEST_SCRIPT_URL,
};
pub use tokenizer::AcceptTokenizer;
