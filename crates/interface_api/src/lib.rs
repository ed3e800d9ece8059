//! HTTP API Layer
//!
//! The interactive surface consumed by an external UI: run a batch, view
//! its results, list claims flagged for review, submit overrides. Batch
//! results are held in memory for the process lifetime.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{bootstrap, config::AppConfig, create_router};
//!
//! let state = bootstrap(AppConfig::from_env()?)?;
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod store;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckable;
use domain_adjudication::{ClaimPipeline, PipelineConfig};
use domain_anomaly::{AnomalyConfig, AnomalyScorer};
use domain_policy::{IndexRetriever, PassageIndex, PassageSplitter, PolicyCorpus};
use infra_llm::OpenAiChatAdapter;
use infra_notify::{LogNotifier, SmtpNotifier};

use crate::config::AppConfig;
use crate::handlers::{batches, health};
use crate::middleware::{api_key_middleware, audit_middleware};
use crate::store::BatchStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ClaimPipeline>,
    pub store: Arc<BatchStore>,
    pub model_health: Arc<dyn HealthCheckable>,
    pub config: AppConfig,
}

/// Wires the real adapters from configuration
///
/// The policy corpus is ingested once at startup; a missing policy file
/// path yields an empty corpus and the pipeline's empty-context behavior.
pub fn bootstrap(config: AppConfig) -> anyhow::Result<AppState> {
    let corpus = match &config.policy_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            PolicyCorpus::from_text(&text, &PassageSplitter::default())
        }
        None => {
            tracing::warn!("No policy document configured; compliance checks will lack context");
            PolicyCorpus::empty()
        }
    };
    let retriever = Arc::new(IndexRetriever::new(PassageIndex::build(&corpus)));

    let model = Arc::new(OpenAiChatAdapter::new(config.llm_config())?);

    let notifier: Arc<dyn domain_adjudication::ReviewerNotifier> = match config.smtp_config() {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => {
            tracing::info!("SMTP not configured; escalations will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let scorer = AnomalyScorer::new(AnomalyConfig {
        flag_sigma: config.anomaly_flag_sigma,
        ..AnomalyConfig::default()
    });

    let pipeline = Arc::new(ClaimPipeline::new(
        model.clone(),
        retriever,
        notifier,
        scorer,
        PipelineConfig {
            retrieval_top_k: config.retrieval_top_k,
        },
    ));

    Ok(AppState {
        pipeline,
        store: Arc::new(BatchStore::new()),
        model_health: model,
        config,
    })
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no API key required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Batch routes
    let batch_routes = Router::new()
        .route("/", post(batches::run_batch))
        .route("/:id", get(batches::get_batch))
        .route("/:id/flagged", get(batches::flagged_claims))
        .route(
            "/:id/claims/:claim_number/override",
            post(batches::submit_override),
        );

    let api_routes = Router::new()
        .nest("/batches", batch_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
