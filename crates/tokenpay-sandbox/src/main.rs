//! # Tokenpay Sandbox
//!
//! Local payment backend simulator for the tokenpay SDK.
//!
//! ## Usage
//!
//! ```bash
//! # Optionally pick the simulated processor
//! export SANDBOX_PROCESSOR=authorizenet
//!
//! # Run the server
//! tokenpay-sandbox
//! ```

use tokenpay_sandbox::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    match &state.processor {
        Some(config) => info!(
            "Simulating processor: {} ({})",
            config.processor.slug, config.processor.environment
        ),
        None => info!("Simulating a merchant with no processor configured"),
    }

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🚀 Tokenpay sandbox starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("🔑 Client config: GET http://{}/payment/client-config", addr);
        info!("💳 Charge: POST http://{}/payment/charge", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  💳 Tokenpay Sandbox 💳
  ━━━━━━━━━━━━━━━━━━━━━━━
  Payment backend simulator
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
