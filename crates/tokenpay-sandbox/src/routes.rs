//! # Routes
//!
//! Axum router configuration for the payment sandbox.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - GET  /payment/client-config - Processor identity plus client keys
/// - GET  /payment/processor - Processor identity only
/// - POST /payment/charge - One-step charge
/// - POST /payment/authorize - Place a hold
/// - POST /payment/capture - Capture a hold
/// - POST /payment/void - Release a hold
pub fn create_router(state: AppState) -> Router {
    // Browser SDKs call this from arbitrary origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let payment_routes = Router::new()
        .route("/client-config", get(handlers::client_config))
        .route("/processor", get(handlers::processor_info))
        .route("/charge", post(handlers::charge))
        .route("/authorize", post(handlers::authorize))
        .route("/capture", post(handlers::capture))
        .route("/void", post(handlers::void));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // Payment API
        .nest("/payment", payment_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    //! End-to-end tests driving the real SDK gateway against this
    //! router over a live TCP socket.

    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokenpay_client::{GatewayBuilder, GatewayConfig, PaymentGateway};
    use tokenpay_core::{
        Amount, CaptureRequest, ChargeRequest, PaymentError, PaymentResult, ProcessorConfig,
        ProcessorEnvironment, ProcessorInfo, ScriptLoader, ScriptRegistry, TransactionStatus,
        VoidRequest,
    };

    /// Stands in for the processor's hosted client runtime
    #[derive(Debug)]
    struct NoopLoader;

    #[async_trait]
    impl ScriptLoader for NoopLoader {
        async fn fetch(&self, _url: &str) -> PaymentResult<()> {
            Ok(())
        }
    }

    fn sandbox_processor() -> ProcessorConfig {
        ProcessorConfig::new(ProcessorInfo::new(
            "authorizenet",
            "Authorize.Net",
            ProcessorEnvironment::Test,
        ))
        .with_key("api_login_id", "sandbox_login")
        .with_key("client_key", "sandbox_client_key")
    }

    async fn serve(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn gateway(base_url: &str) -> PaymentGateway {
        GatewayBuilder::new(GatewayConfig::new(base_url, "sandbox_key"))
            .with_script_registry(Arc::new(ScriptRegistry::new()))
            .with_script_loader(Arc::new(NoopLoader))
            .build()
    }

    fn amount(s: &str) -> Amount {
        Amount::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_gateway_loads_from_live_server() {
        let base = serve(AppState::with_processor(sandbox_processor())).await;
        let gateway = gateway(&base);

        let config = gateway.load().await.unwrap();
        assert_eq!(config.processor.slug, "authorizenet");
        assert!(gateway.is_loaded());
    }

    #[tokio::test]
    async fn test_gateway_surfaces_unconfigured_merchant() {
        let base = serve(AppState::without_processor()).await;
        let gateway = gateway(&base);

        let err = gateway.load().await.unwrap_err();
        assert!(matches!(err, PaymentError::NoProcessorConfigured));
    }

    #[tokio::test]
    async fn test_end_to_end_charge() {
        let base = serve(AppState::with_processor(sandbox_processor())).await;
        let gateway = gateway(&base);
        gateway.load().await.unwrap();

        let outcome = gateway
            .charge(ChargeRequest::new("tok_sandbox", amount("49.99")))
            .await
            .unwrap();
        assert!(outcome.success);

        let transaction = outcome.transaction.unwrap();
        assert_eq!(transaction.status, TransactionStatus::Charged);
        assert_eq!(transaction.processor.as_deref(), Some("authorizenet"));
    }

    #[tokio::test]
    async fn test_end_to_end_decline_is_a_value() {
        let base = serve(AppState::with_processor(sandbox_processor())).await;
        let gateway = gateway(&base);
        gateway.load().await.unwrap();

        let outcome = gateway
            .charge(ChargeRequest::new("tok_sandbox_declined", amount("49.99")))
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.error.unwrap().code.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_end_to_end_authorize_capture_and_void() {
        let base = serve(AppState::with_processor(sandbox_processor())).await;
        let gateway = gateway(&base);
        gateway.load().await.unwrap();

        // First hold: capture a partial amount
        let hold = gateway
            .authorize(ChargeRequest::new("tok_sandbox", amount("100.00")))
            .await
            .unwrap();
        let hold_id = hold.transaction_id().unwrap().to_string();

        let captured = gateway
            .capture(CaptureRequest::new(&hold_id).with_amount(amount("60.00")))
            .await
            .unwrap();
        assert!(captured.success);
        let transaction = captured.transaction.unwrap();
        assert_eq!(transaction.status, TransactionStatus::Captured);
        assert_eq!(transaction.amount.as_ref().map(Amount::as_str), Some("60.00"));

        // Second hold: release it instead
        let hold = gateway
            .authorize(ChargeRequest::new("tok_sandbox", amount("25.00")))
            .await
            .unwrap();
        let hold_id = hold.transaction_id().unwrap().to_string();

        let voided = gateway.void(VoidRequest::new(&hold_id)).await.unwrap();
        assert!(voided.success);
        assert_eq!(
            voided.transaction.unwrap().status,
            TransactionStatus::Voided
        );
    }
}
