//! Warranty Claims Domain
//!
//! This crate owns the claim record as loaded from the input table, the
//! row-level validation that gates automated scoring, and the decision /
//! reviewer-override model that every pipeline run produces.
//!
//! # Lifecycle
//!
//! ```text
//! CSV row -> ClaimRecord -> scored/checked/decided -> TriageStatus
//!        \-> RejectedRow (malformed input, flagged for manual correction)
//! ```

pub mod record;
pub mod loader;
pub mod decision;
pub mod error;

pub use record::{ClaimRecord, NumericField};
pub use loader::{ClaimLoader, LoadedBatch, RejectedRow};
pub use decision::{
    final_verdict, AgentDecision, DecisionVerdict, ReviewerOverride, TriageStatus,
};
pub use error::ClaimError;
