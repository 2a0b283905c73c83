//! # Application State
//!
//! Shared state for the Axum application: the processor fixture this
//! sandbox answers for, and the in-memory transaction store that backs
//! the authorize/capture/void lifecycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokenpay_core::{
    Amount, ProcessorConfig, ProcessorEnvironment, ProcessorInfo, Transaction, TransactionStatus,
};

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// One simulated transaction and its lifecycle state
#[derive(Debug, Clone)]
pub struct TransactionRecord {
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub amount: Amount,
    pub auth_code: Option<String>,
    pub processor: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// Project the record into the wire shape
    pub fn to_transaction(&self) -> Transaction {
        Transaction {
            transaction_id: self.transaction_id.clone(),
            status: self.status,
            auth_code: self.auth_code.clone(),
            response_code: Some("1".to_string()),
            processor: self.processor.clone(),
            amount: Some(self.amount.clone()),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The processor this sandbox answers for; `None` simulates a
    /// merchant with no processor configured
    pub processor: Option<ProcessorConfig>,
    /// In-memory transaction store
    transactions: Arc<Mutex<HashMap<String, TransactionRecord>>>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create state from environment variables and the processor
    /// fixture file
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let processor = load_processor_fixture()?;

        Ok(Self {
            processor,
            transactions: Arc::new(Mutex::new(HashMap::new())),
            config,
        })
    }

    /// State answering for an explicit processor (for tests)
    pub fn with_processor(processor: ProcessorConfig) -> Self {
        Self {
            processor: Some(processor),
            transactions: Arc::new(Mutex::new(HashMap::new())),
            config: test_config(),
        }
    }

    /// State simulating a merchant with no processor configured
    pub fn without_processor() -> Self {
        Self {
            processor: None,
            transactions: Arc::new(Mutex::new(HashMap::new())),
            config: test_config(),
        }
    }

    /// Store a freshly created transaction record
    pub fn insert_transaction(&self, record: TransactionRecord) {
        self.lock().insert(record.transaction_id.clone(), record);
    }

    /// Snapshot of a stored transaction record
    pub fn transaction(&self, transaction_id: &str) -> Option<TransactionRecord> {
        self.lock().get(transaction_id).cloned()
    }

    /// Run `f` with exclusive access to the store, so a lookup and the
    /// state transition it justifies happen atomically
    pub fn with_transactions<R>(
        &self,
        f: impl FnOnce(&mut HashMap<String, TransactionRecord>) -> R,
    ) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, TransactionRecord>> {
        self.transactions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
    }
}

// ===== Processor fixture =====

/// `config/processors.toml` shape
#[derive(Debug, Deserialize)]
struct ProcessorsFile {
    /// Slug of the processor the sandbox simulates; absent simulates a
    /// merchant with none configured
    #[serde(default)]
    active: Option<String>,
    #[serde(default)]
    processors: HashMap<String, ProcessorEntry>,
}

#[derive(Debug, Deserialize)]
struct ProcessorEntry {
    name: String,
    environment: ProcessorEnvironment,
    #[serde(default)]
    client_config: HashMap<String, String>,
}

/// Load the processor fixture from `config/processors.toml`.
///
/// The `SANDBOX_PROCESSOR` env var overrides the file's `active`
/// selection, so one fixture file can serve every processor it defines.
fn load_processor_fixture() -> anyhow::Result<Option<ProcessorConfig>> {
    let config_paths = [
        "config/processors.toml",
        "../config/processors.toml",
        "../../config/processors.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let file: ProcessorsFile = toml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;

            let active = std::env::var("SANDBOX_PROCESSOR").ok().or(file.active);
            let Some(slug) = active else {
                tracing::warn!("No active processor in {}, simulating an unconfigured merchant", path);
                return Ok(None);
            };

            let entry = file.processors.get(&slug).ok_or_else(|| {
                anyhow::anyhow!("Active processor {:?} is not defined in {}", slug, path)
            })?;

            tracing::info!("Simulating processor {} from {}", slug, path);
            let info = ProcessorInfo::new(slug.clone(), entry.name.clone(), entry.environment);
            let mut config = ProcessorConfig::new(info);
            config.client_config = entry.client_config.clone();
            return Ok(Some(config));
        }
    }

    tracing::warn!("No processor fixture found, simulating an unconfigured merchant");
    Ok(None)
}
