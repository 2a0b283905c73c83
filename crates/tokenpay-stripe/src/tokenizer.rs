//! # Elements Tokenizer
//!
//! `CardTokenizer` implementation for Stripe Elements. The card fields
//! live in a Stripe-hosted element; tokenization turns that opaque
//! reference into a payment method id. No client-side validation runs
//! here because Stripe validates on its side and its errors are
//! already user-ready.

use std::sync::OnceLock;

use async_trait::async_trait;
use tracing::{debug, instrument};

use tokenpay_core::{
    BillingDetails, CardInput, CardTokenizer, PaymentError, PaymentResult, PaymentToken,
    ProcessorConfig, TokenizerContext,
};

use crate::client::ElementsClient;
use crate::config::{ElementsConfig, DESCRIPTOR, SLUG};

/// Stripe Elements tokenization backend.
///
/// The API client exists only after [`load`](CardTokenizer::load) has
/// completed; `tokenize` fails fast with [`PaymentError::NotLoaded`]
/// until then and never loads implicitly.
pub struct ElementsTokenizer {
    config: ElementsConfig,
    context: TokenizerContext,
    client: OnceLock<ElementsClient>,
}

impl ElementsTokenizer {
    /// Create a tokenizer from an explicit Elements configuration
    pub fn new(config: ElementsConfig, context: TokenizerContext) -> Self {
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
        let elements = ElementsConfig::from_processor_config(config)?;
        Ok(Self::new(elements, context.clone()))
    }
}

#[async_trait]
impl CardTokenizer for ElementsTokenizer {
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

        // The API client exists iff the runtime loaded
        let _ = self
            .client
            .get_or_init(|| ElementsClient::new(self.config.clone()));
        debug!("Elements runtime ready");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.client.get().is_some()
    }

    async fn tokenize(
        &self,
        input: CardInput,
        billing: Option<BillingDetails>,
    ) -> PaymentResult<PaymentToken> {
        let client = self.client.get().ok_or(PaymentError::NotLoaded)?;

        let element = match input {
            CardInput::Element(element) => element,
            CardInput::Raw(_) => {
                return Err(PaymentError::Validation(
                    "This processor tokenizes a mounted card element, not raw fields".to_string(),
                ))
            }
        };

        client.create_payment_method(&element, billing.as_ref()).await
    }
}
