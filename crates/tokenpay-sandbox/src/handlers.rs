//! # Request Handlers
//!
//! Axum request handlers for the payment sandbox. The sandbox speaks
//! the same wire contract a production payment backend would: processor
//! discovery, one-step charges and the authorize/capture/void
//! lifecycle. Declines and lifecycle violations are reported as
//! `success: false` outcomes at HTTP 200, never as transport errors.
//!
//! Any `Authorization` header is accepted; API-key verification belongs
//! to a real backend, not a simulator.

use crate::state::{AppState, TransactionRecord};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;
use tokenpay_core::{
    AuthorizeEnvelope, CaptureRequest, ChargeBody, ClientConfigResponse, PaymentError,
    PaymentResult, ProcessorResponse, TransactionOutcome, TransactionStatus, VoidRequest,
};
use tracing::{info, instrument};
use uuid::Uuid;

/// Tokens with this suffix simulate an issuer decline
const DECLINE_SUFFIX: &str = "_declined";

// =============================================================================
// Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "tokenpay-sandbox",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Client-side processor configuration; `processor` is null when the
/// merchant has none configured
pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfigResponse> {
    match &state.processor {
        Some(config) => Json(config.clone().into()),
        None => Json(ClientConfigResponse {
            processor: None,
            client_config: Default::default(),
        }),
    }
}

/// Processor identity only, without key material
pub async fn processor_info(State(state): State<AppState>) -> Json<ProcessorResponse> {
    Json(ProcessorResponse {
        processor: state.processor.as_ref().map(|c| c.processor.clone()),
    })
}

/// One-step charge: authorize and capture in a single call
#[instrument(skip(state, body), fields(amount = %body.amount))]
pub async fn charge(
    State(state): State<AppState>,
    Json(body): Json<ChargeBody>,
) -> Result<Json<TransactionOutcome>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = process_payment(&state, &body, "txn", TransactionStatus::Charged)
        .map_err(payment_error_to_response)?;

    if let Some(id) = outcome.transaction_id() {
        info!("Charged transaction: {}", id);
    }

    Ok(Json(outcome))
}

/// Authorize only: place a hold to capture or void later
#[instrument(skip(state, body), fields(amount = %body.amount))]
pub async fn authorize(
    State(state): State<AppState>,
    Json(body): Json<ChargeBody>,
) -> Result<Json<AuthorizeEnvelope>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = process_payment(&state, &body, "auth", TransactionStatus::Authorized)
        .map_err(payment_error_to_response)?;

    if let Some(id) = outcome.transaction_id() {
        info!("Authorized transaction: {}", id);
    }

    Ok(Json(outcome.into()))
}

/// Capture a previously authorized transaction, optionally for a
/// partial amount
#[instrument(skip(state, request), fields(transaction_id = %request.transaction_id))]
pub async fn capture(
    State(state): State<AppState>,
    Json(request): Json<CaptureRequest>,
) -> Result<Json<TransactionOutcome>, (StatusCode, Json<ErrorResponse>)> {
    request.validate().map_err(payment_error_to_response)?;

    // Lookup and transition under one lock, so two captures racing on
    // the same hold cannot both succeed
    let outcome = state.with_transactions(|transactions| {
        let Some(record) = transactions.get_mut(&request.transaction_id) else {
            return TransactionOutcome::declined(
                format!("Transaction not found: {}", request.transaction_id),
                Some("not_found".to_string()),
            );
        };

        if record.status != TransactionStatus::Authorized {
            return TransactionOutcome::declined(
                "Only authorized transactions can be captured",
                Some("cannot_capture".to_string()),
            );
        }

        if let Some(amount) = &request.amount {
            if amount.exceeds(&record.amount) {
                return TransactionOutcome::declined(
                    "Capture amount exceeds the authorized amount",
                    Some("amount_exceeded".to_string()),
                );
            }
            record.amount = amount.clone();
        }

        record.status = TransactionStatus::Captured;
        TransactionOutcome::ok(record.to_transaction())
    });

    if outcome.success {
        info!("Captured transaction: {}", request.transaction_id);
    }

    Ok(Json(outcome))
}

/// Void a previously authorized transaction, releasing the hold
#[instrument(skip(state, request), fields(transaction_id = %request.transaction_id))]
pub async fn void(
    State(state): State<AppState>,
    Json(request): Json<VoidRequest>,
) -> Result<Json<TransactionOutcome>, (StatusCode, Json<ErrorResponse>)> {
    request.validate().map_err(payment_error_to_response)?;

    let outcome = state.with_transactions(|transactions| {
        let Some(record) = transactions.get_mut(&request.transaction_id) else {
            return TransactionOutcome::declined(
                format!("Transaction not found: {}", request.transaction_id),
                Some("not_found".to_string()),
            );
        };

        match record.status {
            TransactionStatus::Authorized => {
                record.status = TransactionStatus::Voided;
                TransactionOutcome::ok(record.to_transaction())
            }
            TransactionStatus::Voided => TransactionOutcome::declined(
                "Transaction has already been voided",
                Some("cannot_void".to_string()),
            ),
            _ => TransactionOutcome::declined(
                "Transaction has already been captured",
                Some("cannot_void".to_string()),
            ),
        }
    });

    if outcome.success {
        info!("Voided transaction: {}", request.transaction_id);
    }

    Ok(Json(outcome))
}

/// Shared charge/authorize simulation
fn process_payment(
    state: &AppState,
    body: &ChargeBody,
    prefix: &str,
    status: TransactionStatus,
) -> PaymentResult<TransactionOutcome> {
    if body.token.is_empty() {
        return Err(PaymentError::Validation(
            "A payment token is required".to_string(),
        ));
    }

    if body.token.ends_with(DECLINE_SUFFIX) {
        return Ok(TransactionOutcome::declined(
            "Card declined",
            Some("2".to_string()),
        ));
    }

    let record = TransactionRecord {
        transaction_id: format!("{}_{}", prefix, Uuid::new_v4().simple()),
        status,
        amount: body.amount.clone(),
        auth_code: Some(auth_code()),
        processor: state.processor.as_ref().map(|c| c.processor.slug.clone()),
        created_at: Utc::now(),
    };

    state.insert_transaction(record.clone());
    Ok(TransactionOutcome::ok(record.to_transaction()))
}

fn auth_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..6].to_uppercase()
}
