//! # Tokenization Inputs and Outputs
//!
//! Inputs differ per processor family: dispatch-style processors take
//! raw card fields, Elements-style processors take an opaque reference
//! to an element they host themselves. The output is always the same
//! `{token, descriptor}` pair, which is the only contract the payment
//! gateway depends on.

use serde::{Deserialize, Serialize};

use crate::card::CardDetails;

/// Tokenization input accepted by [`tokenize`].
///
/// [`tokenize`]: crate::tokenizer::CardTokenizer::tokenize
#[derive(Debug, Clone)]
pub enum CardInput {
    /// Raw card fields, validated client-side before dispatch
    Raw(CardDetails),
    /// Reference to a processor-hosted card element
    Element(ElementRef),
}

impl From<CardDetails> for CardInput {
    fn from(details: CardDetails) -> Self {
        CardInput::Raw(details)
    }
}

impl From<ElementRef> for CardInput {
    fn from(element: ElementRef) -> Self {
        CardInput::Element(element)
    }
}

/// Opaque handle to a processor-hosted card element.
///
/// Elements-style processors mount their own inputs; the SDK holds only
/// this reference and never sees the underlying card data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef(String);

impl ElementRef {
    /// Wrap a processor element identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The processor-side identifier
    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Cardholder billing details, all optional.
///
/// Serializes to `{}` when nothing is set, which is the default the
/// charge endpoints expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl BillingDetails {
    /// Empty billing details
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: cardholder name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: contact email
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder: contact phone
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Builder: billing address
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }
}

/// Postal address, all fields optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Uniform tokenization result.
///
/// `token` is the opaque single-use reference minted by the processor;
/// `descriptor` tells the backend which processor shape the token has.
/// Both travel to the charge endpoints verbatim. The token's short TTL
/// is enforced by the processor, not tracked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentToken {
    pub token: String,
    pub descriptor: String,
}

impl PaymentToken {
    /// Create a token pair
    pub fn new(token: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            descriptor: descriptor.into(),
        }
    }
}
