//! # Accept Tokenizer
//!
//! `CardTokenizer` implementation for Authorize.Net Accept. Raw card
//! fields are validated locally first (the dispatch API has no format
//! checks of its own), then exchanged for an opaque token.

use std::sync::OnceLock;

use async_trait::async_trait;
use tracing::{debug, instrument};

use tokenpay_core::{
    BillingDetails, CardInput, CardTokenizer, PaymentError, PaymentResult, PaymentToken,
    ProcessorConfig, TokenizerContext,
};

use crate::client::AcceptClient;
use crate::config::{AcceptConfig, DESCRIPTOR, SLUG};

/// Authorize.Net Accept tokenization backend.
///
/// The dispatch client exists only after [`load`](CardTokenizer::load)
/// has completed; `tokenize` fails fast with
/// [`PaymentError::NotLoaded`] until then and never loads implicitly.
pub struct AcceptTokenizer {
    config: AcceptConfig,
    context: TokenizerContext,
    client: OnceLock<AcceptClient>,
}

impl AcceptTokenizer {
    /// Create a tokenizer from an explicit Accept configuration
    pub fn new(config: AcceptConfig, context: TokenizerContext) -> Self {
        Self {
            config,
            context,
            client: OnceLock::new(),
        }
    }

    /// Create a tokenizer from the backend-supplied processor config
    pub fn from_processor_config(
        config: &ProcessorConfig,
        context: &TokenizerContext,
    ) -> PaymentResult<Self> {
        let accept = AcceptConfig::from_processor_config(config)?;
        Ok(Self::new(accept, context.clone()))
    }
}

#[async_trait]
impl CardTokenizer for AcceptTokenizer {
    fn slug(&self) -> &'static str {
        SLUG
    }

    fn descriptor(&self) -> &'static str {
        DESCRIPTOR
    }

    fn script_url(&self) -> &str {
        &self.config.script_url
    }

    #[instrument(skip(self), fields(processor = SLUG))]
    async fn load(&self) -> PaymentResult<()> {
        self.context
            .script_registry
            .ensure_loaded(&self.config.script_url, self.context.script_loader.clone())
            .await?;

        // The dispatch client exists iff the runtime loaded
        let _ = self
            .client
            .get_or_init(|| AcceptClient::new(self.config.clone()));
        debug!("Accept runtime ready");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.client.get().is_some()
    }

    async fn tokenize(
        &self,
        input: CardInput,
        _billing: Option<BillingDetails>,
    ) -> PaymentResult<PaymentToken> {
        let client = self.client.get().ok_or(PaymentError::NotLoaded)?;

        let details = match input {
            CardInput::Raw(details) => details,
            CardInput::Element(_) => {
                return Err(PaymentError::Validation(
                    "This processor takes raw card fields, not an element reference".to_string(),
                ))
            }
        };

        let card = details.validate()?;
        client.dispatch_card(&card).await
    }
}
