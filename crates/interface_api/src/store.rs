//! In-memory batch store
//!
//! Batch results live only for the process lifetime; there is no
//! persistent store. Reads serve derived rows, writes are limited to
//! reviewer overrides.

use std::collections::HashMap;

use tokio::sync::RwLock;

use core_kernel::BatchId;
use domain_adjudication::{AdjudicationError, BatchReport, BatchSummary, ClaimResultRow};
use domain_claims::DecisionVerdict;

/// Thread-safe in-memory batch storage
#[derive(Default)]
pub struct BatchStore {
    batches: RwLock<HashMap<BatchId, BatchReport>>,
}

impl BatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a finished batch and returns its id
    pub async fn insert(&self, report: BatchReport) -> BatchId {
        let id = report.id;
        self.batches.write().await.insert(id, report);
        id
    }

    /// Full results table for a batch
    pub async fn rows(&self, id: BatchId) -> Option<Vec<ClaimResultRow>> {
        self.batches.read().await.get(&id).map(|report| report.rows())
    }

    /// Summary and rows in one consistent read
    pub async fn table(&self, id: BatchId) -> Option<(BatchSummary, Vec<ClaimResultRow>)> {
        self.batches
            .read()
            .await
            .get(&id)
            .map(|report| (report.summary(), report.rows()))
    }

    /// Summary counts for a batch
    pub async fn summary(&self, id: BatchId) -> Option<BatchSummary> {
        self.batches
            .read()
            .await
            .get(&id)
            .map(|report| report.summary())
    }

    /// Rows for claims waiting on a reviewer
    pub async fn flagged(&self, id: BatchId) -> Option<Vec<ClaimResultRow>> {
        self.batches.read().await.get(&id).map(|report| {
            report
                .pending_review()
                .into_iter()
                .map(ClaimResultRow::from_dossier)
                .collect()
        })
    }

    /// Applies a reviewer override inside the stored batch
    pub async fn apply_override(
        &self,
        id: BatchId,
        claim_number: &str,
        verdict: DecisionVerdict,
        reviewer: &str,
        comment: Option<String>,
    ) -> Option<Result<ClaimResultRow, AdjudicationError>> {
        self.batches
            .write()
            .await
            .get_mut(&id)
            .map(|report| report.apply_override(claim_number, verdict, reviewer, comment))
    }
}
