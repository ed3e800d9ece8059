//! Adjudication domain errors

use thiserror::Error;

use crate::dossier::DossierError;

/// Errors raised outside the fail-closed path (reporting, overrides)
#[derive(Debug, Error)]
pub enum AdjudicationError {
    #[error("Claim not found in batch: {0}")]
    ClaimNotFound(String),

    #[error(transparent)]
    Dossier(#[from] DossierError),

    #[error(transparent)]
    Claim(#[from] domain_claims::ClaimError),

    #[error("Failed to write results table: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
