//! # Accept Configuration
//!
//! Public-key configuration for the Authorize.Net Accept integration.
//! Everything here is client-safe; transaction keys stay on the
//! backend.

use tokenpay_core::{PaymentResult, ProcessorConfig, ProcessorEnvironment};

/// Registry slug for this processor
pub const SLUG: &str = "authorizenet";

/// Descriptor stamped on every Accept token; the backend dispatches on
/// this tag when interpreting the opaque value
pub const DESCRIPTOR: &str = "COMMON.ACCEPT.INAPP.PAYMENT";

/// Client runtime URL, sandbox environment
pub const TEST_SCRIPT_URL: &str = "https://jstest.authorize.net/v1/Accept.js";

/// Client runtime URL, production environment
pub const LIVE_SCRIPT_URL: &str = "https://js.authorize.net/v1/Accept.js";

/// Dispatch API base, sandbox environment
pub const TEST_API_BASE_URL: &str = "https://apitest.authorize.net";

/// Dispatch API base, production environment
pub const LIVE_API_BASE_URL: &str = "https://api.authorize.net";

/// Accept integration configuration
#[derive(Debug, Clone)]
pub struct AcceptConfig {
    /// Merchant API login id (public)
    pub api_login_id: String,

    /// Accept client key (public)
    pub client_key: String,

    /// Which Authorize.Net environment the keys belong to
    pub environment: ProcessorEnvironment,

    /// Client runtime URL (environment default, overridable for tests)
    pub script_url: String,

    /// Dispatch API base URL (environment default, overridable for tests)
    pub api_base_url: String,
}

impl AcceptConfig {
    /// Create a configuration with the environment's default URLs
    pub fn new(
        api_login_id: impl Into<String>,
        client_key: impl Into<String>,
        environment: ProcessorEnvironment,
    ) -> Self {
        let (script_url, api_base_url) = match environment {
            ProcessorEnvironment::Test => (TEST_SCRIPT_URL, TEST_API_BASE_URL),
            ProcessorEnvironment::Live => (LIVE_SCRIPT_URL, LIVE_API_BASE_URL),
        };
        Self {
            api_login_id: api_login_id.into(),
            client_key: client_key.into(),
            environment,
            script_url: script_url.to_string(),
            api_base_url: api_base_url.to_string(),
        }
    }

    /// Build from the backend-supplied processor config.
    ///
    /// Requires the `api_login_id` and `client_key` entries in
    /// `client_config`.
    pub fn from_processor_config(config: &ProcessorConfig) -> PaymentResult<Self> {
        let api_login_id = config.public_key("api_login_id")?;
        let client_key = config.public_key("client_key")?;
        Ok(Self::new(
            api_login_id,
            client_key,
            config.processor.environment,
        ))
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

    /// Full URL of the dispatch endpoint
    pub fn dispatch_url(&self) -> String {
        format!("{}/xml/v1/request.api", self.api_base_url)
    }

    /// Check if using the sandbox environment
    pub fn is_test_mode(&self) -> bool {
        self.environment == ProcessorEnvironment::Test
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenpay_core::ProcessorInfo;

    #[test]
    fn test_environment_selects_urls() {
        let test = AcceptConfig::new("login", "key", ProcessorEnvironment::Test);
        assert_eq!(test.script_url, TEST_SCRIPT_URL);
        assert_eq!(
            test.dispatch_url(),
            "https://apitest.authorize.net/xml/v1/request.api"
        );
        assert!(test.is_test_mode());

        let live = AcceptConfig::new("login", "key", ProcessorEnvironment::Live);
        assert_eq!(live.script_url, LIVE_SCRIPT_URL);
        assert_eq!(
            live.dispatch_url(),
            "https://api.authorize.net/xml/v1/request.api"
        );
        assert!(!live.is_test_mode());
    }

    #[test]
    fn test_from_processor_config() {
        let config = ProcessorConfig::new(ProcessorInfo::new(
            SLUG,
            "Authorize.Net",
            ProcessorEnvironment::Test,
        ))
        .with_key("api_login_id", "login_123")
        .with_key("client_key", "key_456");

        let accept = AcceptConfig::from_processor_config(&config).unwrap();
        assert_eq!(accept.api_login_id, "login_123");
        assert_eq!(accept.client_key, "key_456");
        assert_eq!(accept.environment, ProcessorEnvironment::Test);
    }

    #[test]
    fn test_from_processor_config_missing_key() {
        let config = ProcessorConfig::new(ProcessorInfo::new(
            SLUG,
            "Authorize.Net",
            ProcessorEnvironment::Test,
        ))
        .with_key("api_login_id", "login_123");

        assert!(AcceptConfig::from_processor_config(&config).is_err());
    }

    #[test]
    fn test_url_overrides() {
        let config = AcceptConfig::new("login", "key", ProcessorEnvironment::Test)
            .with_script_url("http://127.0.0.1:9000/Accept.js")
            .with_api_base_url("http://127.0.0.1:9000");
        assert_eq!(config.script_url, "http://127.0.0.1:9000/Accept.js");
        assert_eq!(config.dispatch_url(), "http://127.0.0.1:9000/xml/v1/request.api");
    }
}
