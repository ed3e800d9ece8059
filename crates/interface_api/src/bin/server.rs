//! Claims Triage API Server
//!
//! Starts the HTTP API for the claims triage pipeline.
//!
//! # Usage
//!
//! ```bash
//! # Run with environment variables
//! TRIAGE_LLM_API_KEY=sk-... TRIAGE_POLICY_PATH=policy.txt cargo run --bin triage-api
//! ```
//!
//! # Environment Variables
//!
//! * `TRIAGE_HOST` - Server host (default: 0.0.0.0)
//! * `TRIAGE_PORT` - Server port (default: 8080)
//! * `TRIAGE_API_KEY` - Optional static API key for the HTTP surface
//! * `TRIAGE_POLICY_PATH` - Plain-text policy document to index
//! * `TRIAGE_LLM_BASE_URL` - OpenAI-compatible endpoint (default: https://api.openai.com/v1)
//! * `TRIAGE_LLM_API_KEY` - Model API key
//! * `TRIAGE_LLM_MODEL` - Model name (default: gpt-4.1-mini)
//! * `TRIAGE_SMTP_HOST` / `TRIAGE_EMAIL_FROM` / `TRIAGE_EMAIL_REVIEWER` - escalation mail
//! * `TRIAGE_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use interface_api::{bootstrap, config::AppConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().unwrap_or_default();
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        model = %config.llm_model,
        "Starting claims triage API server"
    );

    let state = bootstrap(config.clone())?;
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
