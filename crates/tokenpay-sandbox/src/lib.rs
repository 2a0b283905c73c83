//! # tokenpay-sandbox
//!
//! Local payment backend simulator for the tokenpay SDK.
//!
//! This crate provides:
//! - Axum-based HTTP server speaking the SDK's backend wire contract
//! - Processor discovery endpoints backed by a TOML fixture
//! - An in-memory transaction store simulating the
//!   authorize/capture/void lifecycle
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/payment/client-config` | Processor identity plus client keys |
//! | GET | `/payment/processor` | Processor identity only |
//! | POST | `/payment/charge` | One-step charge |
//! | POST | `/payment/authorize` | Place a hold |
//! | POST | `/payment/capture` | Capture a hold |
//! | POST | `/payment/void` | Release a hold |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
