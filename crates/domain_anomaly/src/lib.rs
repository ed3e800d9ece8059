//! Anomaly Scoring Domain
//!
//! Computes per-field deviation statistics over a batch of claims and
//! scores each claim against them. Everything here is deterministic: the
//! same input batch always produces the same statistics, z-scores, flags,
//! and buckets.

pub mod stats;
pub mod scorer;

pub use stats::{FieldStats, HistoricalProfile, MIN_STD_DEV};
pub use scorer::{AnomalyAssessment, AnomalyConfig, AnomalyScorer, RiskBucket};
