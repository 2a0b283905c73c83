//! # Accept Dispatch Client
//!
//! Direct client for the Accept secure-payment-container API: validated
//! card fields go in, an opaque single-use token comes out. The
//! processor's `E_WC_*` result codes are mapped to plain-language
//! messages suitable for display next to a card form, with the raw code
//! preserved for diagnostics.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use tokenpay_core::{PaymentError, PaymentResult, PaymentToken, ValidatedCard};

use crate::config::AcceptConfig;

/// Client for the Accept dispatch endpoint
pub struct AcceptClient {
    config: AcceptConfig,
    client: Client,
}

impl AcceptClient {
    /// Create a new dispatch client
    pub fn new(config: AcceptConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Exchange validated card fields for an opaque token.
    ///
    /// The dispatch endpoint answers HTTP 200 for processor-level
    /// rejections too; those surface as [`PaymentError::Tokenize`] with
    /// the mapped message and original code.
    #[instrument(skip(self, card))]
    pub async fn dispatch_card(&self, card: &ValidatedCard) -> PaymentResult<PaymentToken> {
        let request_id = Uuid::new_v4().to_string();
        let body = DispatchEnvelope {
            secure_payment_container_request: ContainerRequest {
                merchant_authentication: MerchantAuthentication {
                    name: &self.config.api_login_id,
                    client_key: &self.config.client_key,
                },
                data: ContainerData {
                    kind: "TOKEN",
                    id: request_id.clone(),
                    token: CardFields {
                        card_number: &card.number,
                        month: &card.expiry.month,
                        year: &card.expiry.year,
                        card_code: &card.cvv,
                    },
                },
            },
        };

        debug!(request_id = %request_id, "Dispatching card to Accept");

        let response = self
            .client
            .post(self.config.dispatch_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        if !status.is_success() {
            error!(status = %status, "Accept dispatch returned non-success status");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: DispatchResponse = serde_json::from_str(&text).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Accept response: {e}"))
        })?;

        if !parsed.messages.result_code.eq_ignore_ascii_case("ok") {
            let (code, text) = parsed
                .messages
                .message
                .first()
                .map(|m| (m.code.clone(), m.text.clone()))
                .unwrap_or_default();
            error!(code = %code, text = %text, "Accept rejected the card");
            return Err(PaymentError::Tokenize {
                message: user_message(&code).to_string(),
                code: Some(code),
                error_type: None,
            });
        }

        let opaque = parsed.opaque_data.ok_or_else(|| {
            PaymentError::tokenize("Something went wrong processing your card. Please try again.")
        })?;

        info!("Accept minted a payment token");
        Ok(PaymentToken::new(opaque.data_value, opaque.data_descriptor))
    }
}

/// Map an Accept result code to a message fit for end users.
///
/// Unknown codes fall through to the generic message; callers keep the
/// raw code alongside it.
pub fn user_message(code: &str) -> &'static str {
    match code {
        "E_WC_05" => "Please enter a valid card number.",
        "E_WC_06" => "Please enter a valid expiration month.",
        "E_WC_07" => "Please enter a valid expiration year.",
        "E_WC_08" => "This card has expired. Please use a different card.",
        "E_WC_10" => "Please enter a valid account number.",
        "E_WC_11" => "Please enter valid routing information.",
        "E_WC_15" => "Please enter a valid security code.",
        "E_WC_21" => "The payment processor rejected the merchant credentials.",
        _ => "Something went wrong processing your card. Please try again.",
    }
}

// =============================================================================
// Accept API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct DispatchEnvelope<'a> {
    #[serde(rename = "securePaymentContainerRequest")]
    secure_payment_container_request: ContainerRequest<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerRequest<'a> {
    merchant_authentication: MerchantAuthentication<'a>,
    data: ContainerData<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MerchantAuthentication<'a> {
    name: &'a str,
    client_key: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerData<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    id: String,
    token: CardFields<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CardFields<'a> {
    card_number: &'a str,
    month: &'a str,
    year: &'a str,
    card_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DispatchResponse {
    #[serde(default)]
    opaque_data: Option<OpaqueData>,
    messages: Messages,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpaqueData {
    data_descriptor: String,
    data_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Messages {
    result_code: String,
    #[serde(default)]
    message: Vec<ResultMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultMessage {
    code: String,
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DESCRIPTOR;
    use tokenpay_core::ProcessorEnvironment;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn card() -> ValidatedCard {
        tokenpay_core::CardDetails::new("4111 1111 1111 1111", "12/30", "123")
            .validate_at(2025, 6)
            .unwrap()
    }

    async fn client_for(server: &MockServer) -> AcceptClient {
        let config = AcceptConfig::new("login_123", "key_456", ProcessorEnvironment::Test)
            .with_api_base_url(server.uri());
        AcceptClient::new(config)
    }

    #[tokio::test]
    async fn test_dispatch_success_returns_opaque_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xml/v1/request.api"))
            .and(body_partial_json(serde_json::json!({
                "securePaymentContainerRequest": {
                    "merchantAuthentication": {
                        "name": "login_123",
                        "clientKey": "key_456"
                    },
                    "data": {
                        "type": "TOKEN",
                        "token": {
                            "cardNumber": "4111111111111111",
                            "month": "12",
                            "year": "30",
                            "cardCode": "123"
                        }
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "opaqueData": {
                    "dataDescriptor": "COMMON.ACCEPT.INAPP.PAYMENT",
                    "dataValue": "eyJjb2RlIjoiOTk5In0="
                },
                "messages": {
                    "resultCode": "Ok",
                    "message": [{"code": "I00001", "text": "Successful."}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server).await.dispatch_card(&card()).await.unwrap();
        assert_eq!(token.token, "eyJjb2RlIjoiOTk5In0=");
        assert_eq!(token.descriptor, DESCRIPTOR);
    }

    #[tokio::test]
    async fn test_dispatch_error_maps_code_and_preserves_it() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xml/v1/request.api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": {
                    "resultCode": "Error",
                    "message": [{"code": "E_WC_08", "text": "Expired Card."}]
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.dispatch_card(&card()).await.unwrap_err();
        match err {
            PaymentError::Tokenize { message, code, .. } => {
                assert_eq!(message, "This card has expired. Please use a different card.");
                assert_eq!(code.as_deref(), Some("E_WC_08"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_unknown_code_gets_generic_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xml/v1/request.api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": {
                    "resultCode": "Error",
                    "message": [{"code": "E_WC_99", "text": "???"}]
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).await.dispatch_card(&card()).await.unwrap_err();
        match err {
            PaymentError::Tokenize { message, code, .. } => {
                assert!(message.contains("try again"));
                assert_eq!(code.as_deref(), Some("E_WC_99"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_http_failure_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/xml/v1/request.api"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.dispatch_card(&card()).await.unwrap_err();
        match err {
            PaymentError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_message_table_covers_known_codes() {
        assert!(user_message("E_WC_05").contains("card number"));
        assert!(user_message("E_WC_08").contains("expired"));
        assert!(user_message("E_WC_11").contains("routing"));
        assert!(user_message("E_WC_15").contains("security code"));
        assert!(user_message("E_WC_xx").contains("try again"));
    }
}
