//! # Elements Client
//!
//! Client for Stripe's create-payment-method API, authenticated with
//! the publishable key. Stripe's errors are already written for end
//! users, so they are surfaced verbatim (message, code, type) with no
//! remapping.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

use tokenpay_core::{BillingDetails, ElementRef, PaymentError, PaymentResult, PaymentToken};

use crate::config::ElementsConfig;

/// Client for the payment-method endpoint
pub struct ElementsClient {
    config: ElementsConfig,
    client: Client,
}

impl ElementsClient {
    /// Create a new Elements client
    pub fn new(config: ElementsConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Convert a mounted card element into a payment method.
    ///
    /// Card data never passes through here; the element reference is
    /// resolved on Stripe's side.
    #[instrument(skip(self, billing), fields(element = %element.id()))]
    pub async fn create_payment_method(
        &self,
        element: &ElementRef,
        billing: Option<&BillingDetails>,
    ) -> PaymentResult<PaymentToken> {
        // Build form data for the Stripe API
        let mut form_params: Vec<(String, String)> = vec![
            ("type".to_string(), "card".to_string()),
            ("element".to_string(), element.id().to_string()),
        ];

        if let Some(billing) = billing {
            if let Some(ref name) = billing.name {
                form_params.push(("billing_details[name]".to_string(), name.clone()));
            }
            if let Some(ref email) = billing.email {
                form_params.push(("billing_details[email]".to_string(), email.clone()));
            }
            if let Some(ref phone) = billing.phone {
                form_params.push(("billing_details[phone]".to_string(), phone.clone()));
            }
            if let Some(ref address) = billing.address {
                let fields = [
                    ("line1", &address.line1),
                    ("line2", &address.line2),
                    ("city", &address.city),
                    ("state", &address.state),
                    ("postal_code", &address.postal_code),
                    ("country", &address.country),
                ];
                for (key, value) in fields {
                    if let Some(value) = value {
                        form_params.push((
                            format!("billing_details[address][{key}]"),
                            value.clone(),
                        ));
                    }
                }
            }
        }

        debug!("Creating Stripe payment method");

        let url = format!("{}/v1/payment_methods", self.config.api_base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .form(&form_params)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        if !status.is_success() {
            // Stripe's message/code/type pass through untouched
            if let Ok(parsed) = serde_json::from_str::<StripeErrorResponse>(&body) {
                error!(
                    code = parsed.error.code.as_deref().unwrap_or(""),
                    "Stripe rejected the payment method"
                );
                return Err(PaymentError::Tokenize {
                    message: parsed.error.message,
                    code: parsed.error.code,
                    error_type: parsed.error.error_type,
                });
            }
            error!(status = %status, "Stripe API error");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let payment_method: PaymentMethodResponse = serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {e}"))
        })?;

        info!("Stripe minted a payment method");
        Ok(PaymentToken::new(
            payment_method.id,
            crate::config::DESCRIPTOR,
        ))
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct PaymentMethodResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    message: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(rename = "type", default)]
    error_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokenpay_core::{Address, ProcessorEnvironment};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ElementsClient {
        let config = ElementsConfig::new("pk_test_abc", ProcessorEnvironment::Test)
            .unwrap()
            .with_api_base_url(server.uri());
        ElementsClient::new(config)
    }

    #[tokio::test]
    async fn test_create_payment_method_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_methods"))
            .and(header("Authorization", "Bearer pk_test_abc"))
            .and(body_string_contains("type=card"))
            .and(body_string_contains("element=elem_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pm_1AbCdEf",
                "object": "payment_method"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server)
            .await
            .create_payment_method(&ElementRef::new("elem_123"), None)
            .await
            .unwrap();
        assert_eq!(token.token, "pm_1AbCdEf");
        assert_eq!(token.descriptor, "stripe_payment_method");
    }

    #[tokio::test]
    async fn test_billing_details_flatten_into_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_methods"))
            .and(body_string_contains("name%5D=Ada+Lovelace"))
            .and(body_string_contains("city%5D=London"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pm_2XyZ"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let billing = BillingDetails::new()
            .with_name("Ada Lovelace")
            .with_address(Address {
                city: Some("London".into()),
                ..Default::default()
            });

        client_for(&server)
            .await
            .create_payment_method(&ElementRef::new("elem_123"), Some(&billing))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_decline_surfaces_stripe_error_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_methods"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": {
                    "message": "Your card was declined.",
                    "code": "card_declined",
                    "type": "card_error"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .create_payment_method(&ElementRef::new("elem_123"), None)
            .await
            .unwrap_err();
        match err {
            PaymentError::Tokenize {
                message,
                code,
                error_type,
            } => {
                assert_eq!(message, "Your card was declined.");
                assert_eq!(code.as_deref(), Some("card_declined"));
                assert_eq!(error_type.as_deref(), Some("card_error"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_methods"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .create_payment_method(&ElementRef::new("elem_123"), None)
            .await
            .unwrap_err();
        match err {
            PaymentError::Api { status, .. } => assert_eq!(status, 500),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
