//! # Card Tokenizer Trait
//!
//! Strategy pattern for card tokenization backends. Each processor
//! implements the `CardTokenizer` capability pair {load, tokenize};
//! the gateway stays processor-agnostic by depending only on the
//! uniform `PaymentToken` result.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CardTokenizer (trait)                    │
//! │  ├── load()                                                 │
//! │  ├── tokenize()                                             │
//! │  └── slug() / descriptor() / script_url()                   │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!          ┌─────────────────┼─────────────────┐
//!          │                 │                 │
//!  ┌───────┴───────┐ ┌───────┴───────┐ ┌───────┴───────┐
//!  │AcceptTokenizer│ │   Elements    │ │  third-party  │
//!  │ (authorizenet)│ │Tokenizer      │ │  (register a  │
//!  │               │ │ (stripe)      │ │   factory)    │
//!  └───────────────┘ └───────────────┘ └───────────────┘
//! ```
//!
//! Unlike a selector of ready-made instances, the registry maps a
//! processor slug to a *factory*: tokenizers are constructed lazily,
//! once the backend has said which processor is active and with which
//! public keys. Adding a processor means registering one factory.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProcessorConfig;
use crate::error::{PaymentError, PaymentResult};
use crate::loader::{ScriptLoader, ScriptRegistry};
use crate::token::{BillingDetails, CardInput, PaymentToken};

/// Capability set every tokenization backend implements.
///
/// `load` fetches and initializes the processor's client runtime;
/// `tokenize` converts card input into a single-use token. `tokenize`
/// fails fast with [`PaymentError::NotLoaded`] when `load` has not
/// completed on this handle; it never loads implicitly.
#[async_trait]
pub trait CardTokenizer: Send + Sync {
    /// Registry slug this tokenizer serves (e.g. `authorizenet`)
    fn slug(&self) -> &'static str;

    /// Descriptor stamped on every token this tokenizer mints, telling
    /// the backend how to interpret the opaque value
    fn descriptor(&self) -> &'static str;

    /// Client runtime URL for the configured environment
    fn script_url(&self) -> &str;

    /// Fetch and initialize the client runtime. Safe to call
    /// concurrently; all callers settle with the one underlying fetch.
    async fn load(&self) -> PaymentResult<()>;

    /// True once `load` completed on this handle
    fn is_loaded(&self) -> bool;

    /// Convert card input into a single-use token. `billing` is
    /// consumed by Elements-style processors and ignored by raw-field
    /// processors.
    async fn tokenize(
        &self,
        input: CardInput,
        billing: Option<BillingDetails>,
    ) -> PaymentResult<PaymentToken>;
}

impl std::fmt::Debug for dyn CardTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardTokenizer")
            .field("slug", &self.slug())
            .finish()
    }
}

/// Type alias for a shared tokenizer (dynamic dispatch)
pub type BoxedTokenizer = Arc<dyn CardTokenizer>;

/// Construction-time dependencies handed to every tokenizer factory
#[derive(Clone)]
pub struct TokenizerContext {
    /// Shared load-state registry (usually [`ScriptRegistry::global`])
    pub script_registry: Arc<ScriptRegistry>,
    /// Transport used to fetch client runtimes
    pub script_loader: Arc<dyn ScriptLoader>,
}

impl TokenizerContext {
    /// Create a context from its two collaborators
    pub fn new(script_registry: Arc<ScriptRegistry>, script_loader: Arc<dyn ScriptLoader>) -> Self {
        Self {
            script_registry,
            script_loader,
        }
    }
}

/// Factory producing a tokenizer from the active processor's public
/// config
pub type TokenizerFactory =
    Arc<dyn Fn(&ProcessorConfig, &TokenizerContext) -> PaymentResult<BoxedTokenizer> + Send + Sync>;

/// Slug-to-factory registry for tokenization backends
#[derive(Clone, Default)]
pub struct TokenizerRegistry {
    factories: HashMap<String, TokenizerFactory>,
}

impl TokenizerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a factory for a processor slug
    pub fn register<F>(&mut self, slug: impl Into<String>, factory: F)
    where
        F: Fn(&ProcessorConfig, &TokenizerContext) -> PaymentResult<BoxedTokenizer>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(slug.into(), Arc::new(factory));
    }

    /// Register with builder pattern
    pub fn with_factory<F>(mut self, slug: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ProcessorConfig, &TokenizerContext) -> PaymentResult<BoxedTokenizer>
            + Send
            + Sync
            + 'static,
    {
        self.register(slug, factory);
        self
    }

    /// Construct the tokenizer for the config's processor slug.
    ///
    /// Fails with [`PaymentError::UnsupportedProcessor`] when no
    /// factory is registered for it.
    pub fn create(
        &self,
        config: &ProcessorConfig,
        context: &TokenizerContext,
    ) -> PaymentResult<BoxedTokenizer> {
        let slug = config.processor.slug.as_str();
        let factory = self
            .factories
            .get(slug)
            .ok_or_else(|| PaymentError::UnsupportedProcessor {
                slug: slug.to_string(),
            })?;
        factory(config, context)
    }

    /// List all registered processor slugs
    pub fn slugs(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a processor slug has a factory
    pub fn supports(&self, slug: &str) -> bool {
        self.factories.contains_key(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProcessorEnvironment, ProcessorInfo};

    struct NoopLoader;

    #[async_trait]
    impl ScriptLoader for NoopLoader {
        async fn fetch(&self, _url: &str) -> PaymentResult<()> {
            Ok(())
        }
    }

    struct StubTokenizer {
        slug: &'static str,
    }

    #[async_trait]
    impl CardTokenizer for StubTokenizer {
        fn slug(&self) -> &'static str {
            self.slug
        }

        fn descriptor(&self) -> &'static str {
            "stub_token"
        }

        fn script_url(&self) -> &str {
            "https://js.example.net/v1/runtime.js"
        }

        async fn load(&self) -> PaymentResult<()> {
            Ok(())
        }

        fn is_loaded(&self) -> bool {
            true
        }

        async fn tokenize(
            &self,
            _input: CardInput,
            _billing: Option<BillingDetails>,
        ) -> PaymentResult<PaymentToken> {
            Ok(PaymentToken::new("tok_stub", self.descriptor()))
        }
    }

    fn context() -> TokenizerContext {
        TokenizerContext::new(Arc::new(ScriptRegistry::new()), Arc::new(NoopLoader))
    }

    fn config(slug: &str) -> ProcessorConfig {
        ProcessorConfig::new(ProcessorInfo::new(slug, "Test", ProcessorEnvironment::Test))
    }

    #[test]
    fn test_create_dispatches_on_slug() {
        let registry = TokenizerRegistry::new().with_factory("stub", |_config, _ctx| {
            Ok(Arc::new(StubTokenizer { slug: "stub" }) as BoxedTokenizer)
        });

        assert!(registry.supports("stub"));
        let tokenizer = registry.create(&config("stub"), &context()).unwrap();
        assert_eq!(tokenizer.slug(), "stub");
        assert_eq!(tokenizer.descriptor(), "stub_token");
    }

    #[test]
    fn test_unknown_slug_is_unsupported() {
        let registry = TokenizerRegistry::new();
        let err = registry.create(&config("acme"), &context()).unwrap_err();
        match err {
            PaymentError::UnsupportedProcessor { slug } => assert_eq!(slug, "acme"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_registered_slugs_listed() {
        let mut registry = TokenizerRegistry::new();
        registry.register("a", |_c, _x| {
            Ok(Arc::new(StubTokenizer { slug: "a" }) as BoxedTokenizer)
        });
        registry.register("b", |_c, _x| {
            Ok(Arc::new(StubTokenizer { slug: "b" }) as BoxedTokenizer)
        });

        let mut slugs = registry.slugs();
        slugs.sort_unstable();
        assert_eq!(slugs, vec!["a", "b"]);
    }
}
