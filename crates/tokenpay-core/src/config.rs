//! # Processor Configuration
//!
//! Public-only processor identity and client keys, fetched from the
//! backend. These are the wire shapes of `GET /payment/client-config`
//! and `GET /payment/processor`, shared by the SDK client and the
//! sandbox backend so the two cannot drift apart.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PaymentError, PaymentResult};

/// Processor deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorEnvironment {
    Test,
    Live,
}

impl ProcessorEnvironment {
    /// Lowercase wire form
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessorEnvironment::Test => "test",
            ProcessorEnvironment::Live => "live",
        }
    }
}

impl std::fmt::Display for ProcessorEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the processor active for a merchant account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorInfo {
    /// Registry slug the SDK dispatches on (e.g. `authorizenet`, `stripe`)
    pub slug: String,
    /// Human-readable processor name
    pub name: String,
    /// Which of the processor's environments the keys belong to
    pub environment: ProcessorEnvironment,
}

impl ProcessorInfo {
    /// Create a processor identity
    pub fn new(
        slug: impl Into<String>,
        name: impl Into<String>,
        environment: ProcessorEnvironment,
    ) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            environment,
        }
    }
}

/// Full client-side processor configuration.
///
/// `client_config` carries public key material only; secret keys never
/// leave the backend. Fetched once per gateway instance and immutable
/// after that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    pub processor: ProcessorInfo,
    /// Public keys by name (e.g. `api_login_id`, `publishable_key`)
    #[serde(default)]
    pub client_config: HashMap<String, String>,
}

impl ProcessorConfig {
    /// Create a configuration with no keys yet
    pub fn new(processor: ProcessorInfo) -> Self {
        Self {
            processor,
            client_config: HashMap::new(),
        }
    }

    /// Builder: add a public key entry
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.client_config.insert(name.into(), value.into());
        self
    }

    /// Look up a required public key, failing with a configuration
    /// error that names the missing entry
    pub fn public_key(&self, name: &str) -> PaymentResult<&str> {
        self.client_config
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| {
                PaymentError::Configuration(format!(
                    "Processor {:?} is missing public key {name:?}",
                    self.processor.slug
                ))
            })
    }

    /// True when the keys belong to the processor's test environment
    pub fn is_test(&self) -> bool {
        self.processor.environment == ProcessorEnvironment::Test
    }
}

/// Wire shape of `GET /payment/processor`.
///
/// `processor` is `null` when the merchant has no processor configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorResponse {
    pub processor: Option<ProcessorInfo>,
}

/// Wire shape of `GET /payment/client-config`.
///
/// Like [`ProcessorResponse`], `processor` is nullable so an
/// unconfigured merchant is an answer, not an HTTP error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfigResponse {
    pub processor: Option<ProcessorInfo>,
    #[serde(default)]
    pub client_config: HashMap<String, String>,
}

impl ClientConfigResponse {
    /// Convert into a usable config, failing with
    /// [`PaymentError::NoProcessorConfigured`] when no processor is set
    pub fn into_config(self) -> PaymentResult<ProcessorConfig> {
        let processor = self.processor.ok_or(PaymentError::NoProcessorConfigured)?;
        Ok(ProcessorConfig {
            processor,
            client_config: self.client_config,
        })
    }
}

impl From<ProcessorConfig> for ClientConfigResponse {
    fn from(config: ProcessorConfig) -> Self {
        Self {
            processor: Some(config.processor),
            client_config: config.client_config,
        }
    }
}
