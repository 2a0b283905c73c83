//! # Backend HTTP Client
//!
//! Thin JSON client for the commerce backend's payment endpoints, plus
//! the HTTP loader used to warm processor client runtimes.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use tokenpay_core::{PaymentError, PaymentResult, ScriptLoader};

/// JSON client for the commerce backend.
///
/// Every request carries the public API key as a bearer token. Non-2xx
/// responses are decoded through the backend's error envelope into
/// [`PaymentError::Api`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

/// Backend error envelope: `{"error": "...", "code": 400}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: String,
}

impl ApiClient {
    /// Create a client for the given backend base URL
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// GET a JSON resource from the backend
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PaymentResult<T> {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    /// POST a JSON body, decoding the JSON response
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> PaymentResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> PaymentResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Backend API error: status={}, body={}", status, body);

            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
                return Err(PaymentError::Api {
                    status: status.as_u16(),
                    message: envelope.error,
                });
            }

            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse backend response: {}", e))
        })
    }
}

/// Fetches processor client runtimes over HTTP.
///
/// The fetched body is discarded; completing the fetch is the signal
/// that the runtime is available. No timeout is imposed here: script
/// loading surfaces the transport's own failure semantics.
#[derive(Debug, Clone, Default)]
pub struct HttpScriptLoader {
    client: Client,
}

impl HttpScriptLoader {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScriptLoader for HttpScriptLoader {
    async fn fetch(&self, url: &str) -> PaymentResult<()> {
        debug!("Fetching processor runtime: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PaymentError::ScriptLoad {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaymentError::ScriptLoad {
                url: url.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| PaymentError::ScriptLoad {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        status: String,
    }

    #[tokio::test]
    async fn test_get_json_sends_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payment/processor"))
            .and(header("Authorization", "Bearer pub_key_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), "pub_key_123");
        let pong: Pong = api.get_json("/payment/processor").await.unwrap();
        assert_eq!(pong.status, "ok");
    }

    #[tokio::test]
    async fn test_post_json_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment/charge"))
            .and(body_json(json!({"token": "tok_1", "amount": "9.99"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "charged"})))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), "pub_key_123");
        let pong: Pong = api
            .post_json("/payment/charge", &json!({"token": "tok_1", "amount": "9.99"}))
            .await
            .unwrap();
        assert_eq!(pong.status, "charged");
    }

    #[tokio::test]
    async fn test_error_envelope_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payment/processor"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"error": "unknown merchant", "code": 404})),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), "pub_key_123");
        let err = api.get_json::<Pong>("/payment/processor").await.unwrap_err();
        match err {
            PaymentError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "unknown merchant");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_preserved() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payment/processor"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let api = ApiClient::new(server.uri(), "pub_key_123");
        let err = api.get_json::<Pong>("/payment/processor").await.unwrap_err();
        match err {
            PaymentError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_a_network_error() {
        // Port 1 is never listening
        let api = ApiClient::new("http://127.0.0.1:1", "pub_key_123");
        let err = api.get_json::<Pong>("/payment/processor").await.unwrap_err();
        assert!(matches!(err, PaymentError::Network(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_trailing_slash_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payment/processor"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(format!("{}/", server.uri()), "pub_key_123");
        let pong: Pong = api.get_json("/payment/processor").await.unwrap();
        assert_eq!(pong.status, "ok");
    }

    #[tokio::test]
    async fn test_script_loader_fetches_runtime() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/Accept.js"))
            .respond_with(ResponseTemplate::new(200).set_body_string("// runtime"))
            .expect(1)
            .mount(&server)
            .await;

        let loader = HttpScriptLoader::new();
        let url = format!("{}/v1/Accept.js", server.uri());
        loader.fetch(&url).await.unwrap();
    }

    #[tokio::test]
    async fn test_script_loader_reports_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/Accept.js"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let loader = HttpScriptLoader::new();
        let url = format!("{}/v1/Accept.js", server.uri());
        let err = loader.fetch(&url).await.unwrap_err();
        match err {
            PaymentError::ScriptLoad { url: failed, message } => {
                assert!(failed.ends_with("/v1/Accept.js"));
                assert!(message.contains("404"));
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
