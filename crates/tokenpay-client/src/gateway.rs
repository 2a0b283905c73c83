//! # Payment Gateway
//!
//! The storefront-facing entry point. One gateway instance per
//! merchant backend: it asks the backend which processor is active,
//! loads that processor's client runtime exactly once, mints payment
//! tokens, and drives charges through the backend's payment endpoints.
//!
//! Lifecycle is an explicit state machine (`Idle`, `Loading`, `Ready`,
//! `Failed`). `load()` may be called from any number of tasks; all of
//! them settle with the one underlying load. A failed load keeps any
//! config it managed to fetch, so the next `load()` call retries only
//! the part that failed.

use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, instrument};

use tokenpay_authnet::AcceptTokenizer;
use tokenpay_core::{
    AuthorizeEnvelope, BillingDetails, BoxedTokenizer, CaptureRequest, CardInput, ChargeRequest,
    ClientConfigResponse, PaymentError, PaymentResult, PaymentToken, ProcessorConfig,
    ProcessorInfo, ProcessorResponse, ScriptLoader, ScriptRegistry, TokenizerContext,
    TokenizerRegistry, TransactionOutcome, VoidRequest,
};
use tokenpay_stripe::ElementsTokenizer;

use crate::config::{GatewayConfig, RuntimeContext};
use crate::http::{ApiClient, HttpScriptLoader};

/// Gateway lifecycle phase, for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What a successful load produced. `handler` is `None` in server
/// contexts, where no tokenization runtime exists.
#[derive(Clone)]
struct LoadOutcome {
    config: ProcessorConfig,
    handler: Option<BoxedTokenizer>,
}

/// Load failure, carrying any config fetched before the failure so a
/// retry can skip the backend round trip.
#[derive(Clone)]
struct LoadFailure {
    config: Option<ProcessorConfig>,
    error: PaymentError,
}

impl LoadFailure {
    fn new(config: Option<ProcessorConfig>, error: PaymentError) -> Self {
        Self { config, error }
    }
}

type SharedLoad = Shared<BoxFuture<'static, Result<LoadOutcome, LoadFailure>>>;

enum GatewayState {
    Idle,
    Loading {
        epoch: u64,
        pending: SharedLoad,
    },
    Ready {
        config: ProcessorConfig,
        handler: Option<BoxedTokenizer>,
    },
    Failed {
        config: Option<ProcessorConfig>,
        error: PaymentError,
    },
}

struct Inner {
    state: GatewayState,
    next_epoch: u64,
}

/// Merchant-facing payment gateway.
///
/// Construct via [`PaymentGateway::new`] for the stock processor set,
/// or [`PaymentGateway::builder`] to register third-party processors
/// and swap collaborators in tests.
pub struct PaymentGateway {
    api: Arc<ApiClient>,
    context: RuntimeContext,
    registry: TokenizerRegistry,
    tokenizer_context: TokenizerContext,
    inner: Mutex<Inner>,
}

impl PaymentGateway {
    /// Create a gateway with the stock processor integrations
    pub fn new(config: GatewayConfig) -> Self {
        Self::builder(config).build()
    }

    /// Create a gateway from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Ok(Self::new(GatewayConfig::from_env()?))
    }

    /// Start a builder for custom processor registrations
    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder::new(config)
    }

    /// Fetch the active processor's config and load its client runtime.
    ///
    /// Memoized: concurrent and repeated calls share one underlying
    /// load, and a `Ready` gateway returns its config without touching
    /// the network. In a server context the runtime step is skipped and
    /// only the config is fetched.
    #[instrument(skip(self))]
    pub async fn load(&self) -> PaymentResult<ProcessorConfig> {
        // The lock is never held across an await: take the pending
        // handle (starting the load if needed) and release.
        let (epoch, pending) = {
            let mut inner = self.lock();
            match &inner.state {
                GatewayState::Ready { config, .. } => return Ok(config.clone()),
                GatewayState::Loading { epoch, pending } => (*epoch, pending.clone()),
                GatewayState::Idle => self.begin(&mut inner, None),
                GatewayState::Failed { config, .. } => {
                    let cached = config.clone();
                    self.begin(&mut inner, cached)
                }
            }
        };

        let result = pending.await;
        self.finish(epoch, &result);
        match result {
            Ok(outcome) => Ok(outcome.config),
            Err(failure) => Err(failure.error),
        }
    }

    /// Fetch the active processor's identity.
    ///
    /// Read-through: a config already fetched by [`load`](Self::load)
    /// answers from memory, otherwise the backend is asked directly.
    /// Never triggers script loading.
    #[instrument(skip(self))]
    pub async fn processor(&self) -> PaymentResult<ProcessorInfo> {
        {
            let inner = self.lock();
            match &inner.state {
                GatewayState::Ready { config, .. } => return Ok(config.processor.clone()),
                GatewayState::Failed {
                    config: Some(config),
                    ..
                } => return Ok(config.processor.clone()),
                _ => {}
            }
        }

        let response: ProcessorResponse = self.api.get_json("/payment/processor").await?;
        response.processor.ok_or(PaymentError::NoProcessorConfigured)
    }

    /// Tokenize card input with the loaded processor runtime.
    ///
    /// Never loads implicitly: callers own the `load()` lifecycle, and
    /// tokenizing before a completed load fails with
    /// [`PaymentError::NotLoaded`]. In a server context this is always
    /// [`PaymentError::Environment`].
    #[instrument(skip(self, input, billing))]
    pub async fn tokenize(
        &self,
        input: CardInput,
        billing: Option<BillingDetails>,
    ) -> PaymentResult<PaymentToken> {
        if self.context == RuntimeContext::Server {
            return Err(PaymentError::Environment(
                "tokenization requires a client runtime context".to_string(),
            ));
        }

        let handler = self.handler()?;
        handler.tokenize(input, billing).await
    }

    /// Direct access to the loaded tokenization handler
    pub fn handler(&self) -> PaymentResult<BoxedTokenizer> {
        let inner = self.lock();
        match &inner.state {
            GatewayState::Ready {
                handler: Some(handler),
                ..
            } => Ok(Arc::clone(handler)),
            _ => Err(PaymentError::NotLoaded),
        }
    }

    /// One-step sale: authorize and capture in a single operation.
    ///
    /// A processor decline is a successful call returning an outcome
    /// with `success == false`; errors are reserved for validation and
    /// transport problems.
    #[instrument(skip(self, request))]
    pub async fn charge(&self, request: ChargeRequest) -> PaymentResult<TransactionOutcome> {
        let body = request.into_body()?;
        let outcome: TransactionOutcome = self.api.post_json("/payment/charge", &body).await?;
        info!(
            "Charge settled: success={}, transaction_id={:?}",
            outcome.success,
            outcome.transaction_id()
        );
        Ok(outcome)
    }

    /// Authorize-only: place a hold to capture later
    #[instrument(skip(self, request))]
    pub async fn authorize(&self, request: ChargeRequest) -> PaymentResult<TransactionOutcome> {
        let body = request.into_body()?;
        let envelope: AuthorizeEnvelope = self.api.post_json("/payment/authorize", &body).await?;
        Ok(envelope.into())
    }

    /// Capture a previously authorized transaction. Omitting the amount
    /// captures the full authorized amount.
    #[instrument(skip(self, request), fields(transaction_id = %request.transaction_id))]
    pub async fn capture(&self, request: CaptureRequest) -> PaymentResult<TransactionOutcome> {
        request.validate()?;
        self.api.post_json("/payment/capture", &request).await
    }

    /// Void a previously authorized, uncaptured transaction
    #[instrument(skip(self, request), fields(transaction_id = %request.transaction_id))]
    pub async fn void(&self, request: VoidRequest) -> PaymentResult<TransactionOutcome> {
        request.validate()?;
        self.api.post_json("/payment/void", &request).await
    }

    /// Current lifecycle phase
    pub fn status(&self) -> GatewayStatus {
        let inner = self.lock();
        match &inner.state {
            GatewayState::Idle => GatewayStatus::Idle,
            GatewayState::Loading { .. } => GatewayStatus::Loading,
            GatewayState::Ready { .. } => GatewayStatus::Ready,
            GatewayState::Failed { .. } => GatewayStatus::Failed,
        }
    }

    /// True once `load()` completed successfully
    pub fn is_loaded(&self) -> bool {
        self.status() == GatewayStatus::Ready
    }

    /// Processor slugs this gateway can construct a tokenizer for
    pub fn supported_processors(&self) -> Vec<&str> {
        self.registry.slugs()
    }

    /// Start a fresh load, replacing the current state. `cached` skips
    /// the config fetch when a previous attempt already has one.
    fn begin(&self, inner: &mut Inner, cached: Option<ProcessorConfig>) -> (u64, SharedLoad) {
        inner.next_epoch += 1;
        let epoch = inner.next_epoch;

        let api = Arc::clone(&self.api);
        let registry = self.registry.clone();
        let tokenizer_context = self.tokenizer_context.clone();
        let runtime = self.context;

        let pending: SharedLoad = async move {
            let config = match cached {
                Some(config) => config,
                None => {
                    let response: ClientConfigResponse = api
                        .get_json("/payment/client-config")
                        .await
                        .map_err(|error| LoadFailure::new(None, error))?;
                    response
                        .into_config()
                        .map_err(|error| LoadFailure::new(None, error))?
                }
            };
            debug!("Active processor: {}", config.processor.slug);

            let handler = match runtime {
                RuntimeContext::Server => None,
                RuntimeContext::Client => {
                    let tokenizer = registry
                        .create(&config, &tokenizer_context)
                        .map_err(|error| LoadFailure::new(Some(config.clone()), error))?;
                    tokenizer
                        .load()
                        .await
                        .map_err(|error| LoadFailure::new(Some(config.clone()), error))?;
                    Some(tokenizer)
                }
            };

            info!(
                "Payment gateway ready: processor={}, context={}",
                config.processor.slug, runtime
            );
            Ok(LoadOutcome { config, handler })
        }
        .boxed()
        .shared();

        inner.state = GatewayState::Loading {
            epoch,
            pending: pending.clone(),
        };
        (epoch, pending)
    }

    /// Settle the state for a finished load. The epoch guard keeps a
    /// stale completion from clobbering a newer load.
    fn finish(&self, epoch: u64, result: &Result<LoadOutcome, LoadFailure>) {
        let mut inner = self.lock();
        let matches_epoch = matches!(
            &inner.state,
            GatewayState::Loading { epoch: current, .. } if *current == epoch
        );
        if matches_epoch {
            inner.state = match result {
                Ok(outcome) => GatewayState::Ready {
                    config: outcome.config.clone(),
                    handler: outcome.handler.clone(),
                },
                Err(failure) => GatewayState::Failed {
                    config: failure.config.clone(),
                    error: failure.error.clone(),
                },
            };
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Builder for [`PaymentGateway`].
///
/// Starts with the stock Authorize.Net and Stripe integrations
/// registered. Third-party processors slot in through
/// [`with_tokenizer`](Self::with_tokenizer); registering an existing
/// slug replaces the stock factory.
pub struct GatewayBuilder {
    config: GatewayConfig,
    registry: TokenizerRegistry,
    script_registry: Option<Arc<ScriptRegistry>>,
    script_loader: Option<Arc<dyn ScriptLoader>>,
}

impl GatewayBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        let registry = TokenizerRegistry::new()
            .with_factory(tokenpay_authnet::SLUG, |config, context| {
                let tokenizer = AcceptTokenizer::from_processor_config(config, context)?;
                Ok(Arc::new(tokenizer) as BoxedTokenizer)
            })
            .with_factory(tokenpay_stripe::SLUG, |config, context| {
                let tokenizer = ElementsTokenizer::from_processor_config(config, context)?;
                Ok(Arc::new(tokenizer) as BoxedTokenizer)
            });

        Self {
            config,
            registry,
            script_registry: None,
            script_loader: None,
        }
    }

    /// Register a tokenizer factory for a processor slug
    pub fn with_tokenizer<F>(mut self, slug: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ProcessorConfig, &TokenizerContext) -> PaymentResult<BoxedTokenizer>
            + Send
            + Sync
            + 'static,
    {
        self.registry.register(slug, factory);
        self
    }

    /// Use a private script registry instead of the process-wide one
    pub fn with_script_registry(mut self, registry: Arc<ScriptRegistry>) -> Self {
        self.script_registry = Some(registry);
        self
    }

    /// Swap the transport used to fetch client runtimes
    pub fn with_script_loader(mut self, loader: Arc<dyn ScriptLoader>) -> Self {
        self.script_loader = Some(loader);
        self
    }

    pub fn build(self) -> PaymentGateway {
        let api = Arc::new(ApiClient::new(
            self.config.api_url.clone(),
            self.config.api_key.clone(),
        ));
        let script_registry = self.script_registry.unwrap_or_else(ScriptRegistry::global);
        let script_loader = self
            .script_loader
            .unwrap_or_else(|| Arc::new(HttpScriptLoader::new()));

        PaymentGateway {
            api,
            context: self.config.context,
            registry: self.registry,
            tokenizer_context: TokenizerContext::new(script_registry, script_loader),
            inner: Mutex::new(Inner {
                state: GatewayState::Idle,
                next_epoch: 0,
            }),
        }
    }
}
