//! # Gateway Configuration
//!
//! Backend connection settings for the payment gateway.
//! The API key is public (it only authorizes storefront reads and
//! tokenized charges), but it still comes from the environment rather
//! than source.

use std::env;

use tokenpay_core::{PaymentError, PaymentResult};

/// Runtime context the gateway operates in.
///
/// Tokenization needs a client runtime: the processor script and the
/// card fields live there. Server-side rendering still needs the
/// processor config to produce markup, so `load()` works in both
/// contexts but only `Client` constructs a tokenization handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeContext {
    /// Browser-like runtime; tokenization is available after `load()`
    Client,
    /// Server-side rendering; config only, tokenization is an error
    Server,
}

impl RuntimeContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeContext::Client => "client",
            RuntimeContext::Server => "server",
        }
    }
}

impl std::fmt::Display for RuntimeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Commerce backend base URL (e.g. `https://shop.example.com/api`)
    pub api_url: String,

    /// Public API key, sent as a bearer token on every backend call
    pub api_key: String,

    /// Where this gateway instance runs
    pub context: RuntimeContext,
}

impl GatewayConfig {
    /// Create config with explicit values (for testing)
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            context: RuntimeContext::Client,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `TOKENPAY_API_URL`
    /// - `TOKENPAY_API_KEY`
    ///
    /// Optional:
    /// - `TOKENPAY_CONTEXT` (`client` or `server`, defaults to `client`)
    pub fn from_env() -> PaymentResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_url = env::var("TOKENPAY_API_URL")
            .map_err(|_| PaymentError::Configuration("TOKENPAY_API_URL not set".to_string()))?;

        let api_key = env::var("TOKENPAY_API_KEY")
            .map_err(|_| PaymentError::Configuration("TOKENPAY_API_KEY not set".to_string()))?;

        let context = match env::var("TOKENPAY_CONTEXT") {
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "client" => RuntimeContext::Client,
                "server" => RuntimeContext::Server,
                other => {
                    return Err(PaymentError::Configuration(format!(
                        "TOKENPAY_CONTEXT must be 'client' or 'server', got '{}'",
                        other
                    )))
                }
            },
            Err(_) => RuntimeContext::Client,
        };

        // Validate URL format
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(PaymentError::Configuration(
                "TOKENPAY_API_URL must start with http:// or https://".to_string(),
            ));
        }

        if api_key.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "TOKENPAY_API_KEY must not be empty".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            api_key,
            context,
        })
    }

    /// Builder: run server-side (config only, no tokenization)
    pub fn server_side(mut self) -> Self {
        self.context = RuntimeContext::Server;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_new_defaults_to_client_context() {
        let config = GatewayConfig::new("https://shop.example.com/api", "pub_key_123");
        assert_eq!(config.context, RuntimeContext::Client);
        assert_eq!(config.api_url, "https://shop.example.com/api");
    }

    #[test]
    fn test_server_side_builder() {
        let config = GatewayConfig::new("https://shop.example.com/api", "pub_key_123").server_side();
        assert_eq!(config.context, RuntimeContext::Server);
        assert_eq!(config.context.as_str(), "server");
    }

    #[test]
    fn test_from_env_missing_key() {
        // Clear any existing env vars
        env::remove_var("TOKENPAY_API_URL");

        let result = GatewayConfig::from_env();
        assert!(result.is_err());
    }
}
