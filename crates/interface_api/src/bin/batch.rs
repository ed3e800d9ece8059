//! Claims Triage Batch Runner
//!
//! Runs the full pipeline over a claims CSV and writes the results table.
//!
//! # Usage
//!
//! ```bash
//! TRIAGE_LLM_API_KEY=sk-... triage-batch claims.csv policy.txt results.csv
//! ```
//!
//! The third argument is optional; without it the results CSV goes to
//! stdout. LLM and notification configuration come from the same
//! `TRIAGE_`-prefixed environment as the API server.

use std::path::PathBuf;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use domain_claims::ClaimLoader;
use interface_api::{bootstrap, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::from_env().unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let claims_path: PathBuf = args
        .next()
        .context("usage: triage-batch <claims.csv> <policy.txt> [results.csv]")?
        .into();
    let policy_path = args.next();
    let output_path = args.next();

    // The positional policy path wins over the environment
    if let Some(path) = policy_path {
        config.policy_path = Some(path);
    }

    let state = bootstrap(config)?;

    let loaded = ClaimLoader::default()
        .load_path(&claims_path)
        .with_context(|| format!("failed to load claims from {}", claims_path.display()))?;
    tracing::info!(
        accepted = loaded.records.len(),
        rejected = loaded.rejects.len(),
        "Claims loaded"
    );

    let report = state.pipeline.run_batch(loaded).await;
    let summary = report.summary();

    match output_path {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("failed to create {path}"))?;
            report.write_csv(file)?;
            tracing::info!(output = %path, "Results written");
        }
        None => {
            report.write_csv(std::io::stdout().lock())?;
        }
    }

    tracing::info!(
        total = summary.total,
        approved = summary.approved,
        declined = summary.declined,
        manual_review = summary.manual_review,
        correction_required = summary.correction_required,
        "Batch finished"
    );

    Ok(())
}
