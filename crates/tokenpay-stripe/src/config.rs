//! # Elements Configuration
//!
//! Public-key configuration for the Stripe Elements integration. Only
//! the publishable key travels to the client; secret keys stay on the
//! backend.

use tokenpay_core::{PaymentError, PaymentResult, ProcessorConfig, ProcessorEnvironment};

/// Registry slug for this processor
pub const SLUG: &str = "stripe";

/// Descriptor stamped on every Elements token; the backend dispatches
/// on this tag when interpreting the payment method id
pub const DESCRIPTOR: &str = "stripe_payment_method";

/// Client runtime URL; Stripe serves one script for both environments
pub const SCRIPT_URL: &str = "https://js.stripe.com/v3/";

/// Default API base URL
pub const API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe Elements configuration
#[derive(Debug, Clone)]
pub struct ElementsConfig {
    /// Publishable key (pk_test_... or pk_live_...)
    pub publishable_key: String,

    /// Which environment the key belongs to
    pub environment: ProcessorEnvironment,

    /// Client runtime URL (overridable for tests)
    pub script_url: String,

    /// API base URL (overridable for tests)
    pub api_base_url: String,
}

impl ElementsConfig {
    /// Create a configuration, validating the key prefix
    pub fn new(
        publishable_key: impl Into<String>,
        environment: ProcessorEnvironment,
    ) -> PaymentResult<Self> {
        let publishable_key = publishable_key.into();
        if !publishable_key.starts_with("pk_test_") && !publishable_key.starts_with("pk_live_") {
            return Err(PaymentError::Configuration(
                "Stripe publishable key must start with pk_test_ or pk_live_".to_string(),
            ));
        }
        Ok(Self {
            publishable_key,
            environment,
            script_url: SCRIPT_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        })
    }

    /// Build from the backend-supplied processor config.
    ///
    /// Requires the `publishable_key` entry in `client_config`.
    pub fn from_processor_config(config: &ProcessorConfig) -> PaymentResult<Self> {
        let publishable_key = config.public_key("publishable_key")?;
        Self::new(publishable_key, config.processor.environment)
    }

    /// Builder: set custom script URL (for testing)
    pub fn with_script_url(mut self, url: impl Into<String>) -> Self {
        self.script_url = url.into();
        self
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Check if using a test key
    pub fn is_test_mode(&self) -> bool {
        self.publishable_key.starts_with("pk_test_")
    }

    /// Get authorization header value; client-side Stripe calls
    /// authenticate with the publishable key
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.publishable_key)
    }
}
