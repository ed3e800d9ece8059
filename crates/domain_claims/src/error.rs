//! Claims domain errors

use thiserror::Error;

/// Errors that can occur while parsing or mutating claim data
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid number in {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid date in {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid amount in {field}: {value:?}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("Claim date {claim} precedes purchase date {purchase}")]
    ClaimPrecedesPurchase {
        claim: chrono::NaiveDate,
        purchase: chrono::NaiveDate,
    },

    #[error("Override verdict must be approve or decline, got {0}")]
    InvalidOverrideVerdict(String),

    #[error("Failed to read claims file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse claims table: {0}")]
    Csv(#[from] csv::Error),
}
