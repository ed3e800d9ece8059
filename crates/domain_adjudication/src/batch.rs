//! Batch orchestration
//!
//! Precomputes the historical profile over the loaded batch, then runs
//! each claim through the pipeline in input order. Claims are independent;
//! execution is sequential by design.

use chrono::Utc;
use tracing::info;

use domain_anomaly::HistoricalProfile;
use domain_claims::{ClaimRecord, LoadedBatch, NumericField};

use crate::pipeline::ClaimPipeline;
use crate::report::BatchReport;

/// Builds per-field statistics over every accepted claim in the batch
pub fn historical_profile(records: &[ClaimRecord]) -> HistoricalProfile {
    HistoricalProfile::from_columns(NumericField::ALL.iter().map(|field| {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|record| record.numeric_value(*field))
            .collect();
        (field.column(), values)
    }))
}

impl ClaimPipeline {
    /// Runs the full pipeline over a loaded batch and assembles the report
    ///
    /// Rejected rows skip automated scoring entirely and appear in the
    /// report flagged for manual entry correction.
    pub async fn run_batch(&self, batch: LoadedBatch) -> BatchReport {
        let started_at = Utc::now();
        let profile = historical_profile(&batch.records);

        info!(
            claims = batch.records.len(),
            rejects = batch.rejects.len(),
            profiled_fields = profile.len(),
            "Starting batch run"
        );

        let mut dossiers = Vec::with_capacity(batch.records.len());
        for (position, record) in batch.records.into_iter().enumerate() {
            let claim_number = record.claim_number.clone();
            let dossier = self.run_claim(record, &profile).await;
            info!(
                position,
                claim = %claim_number,
                status = dossier.status().as_str(),
                "Claim processed"
            );
            dossiers.push(dossier);
        }

        let report = BatchReport::new(dossiers, batch.rejects, started_at, Utc::now());
        info!(batch = %report.id, total = report.summary().total, "Batch complete");
        report
    }
}
