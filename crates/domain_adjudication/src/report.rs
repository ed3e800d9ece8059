//! Batch results: flattened rows, summary counts, and overrides
//!
//! The dossier stays authoritative; result rows are derived views. A
//! reviewer override mutates the dossier and every subsequent export
//! reflects it.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::BatchId;
use domain_claims::{DecisionVerdict, RejectedRow, ReviewerOverride, TriageStatus};

use crate::dossier::{ClaimDossier, ReviewState};
use crate::error::AdjudicationError;

/// One row of the results table
///
/// Flat scalars only, so the same struct serializes to both the JSON API
/// and the CSV export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimResultRow {
    pub claim_number: Option<String>,
    pub policy_number: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub claim_date: Option<NaiveDate>,
    pub claimed_amount: Option<Decimal>,
    pub anomaly_score: Option<f64>,
    pub risk_bucket: Option<String>,
    pub anomaly_flag: Option<bool>,
    /// Per-field z-scores as a JSON object
    pub anomaly_features: Option<String>,
    pub policy_coverage: Option<String>,
    pub policy_summary: Option<String>,
    pub policy_context: Option<String>,
    pub fraud_score: Option<f64>,
    pub fraud_reasons: Option<String>,
    pub evidence_summary: Option<String>,
    pub decision: Option<String>,
    pub decision_rationale: Option<String>,
    pub decision_confidence: Option<f64>,
    pub review_reason: Option<String>,
    pub reviewer_notified: Option<bool>,
    pub human_decision: Option<String>,
    pub human_comment: Option<String>,
    /// The override when present, otherwise the agent decision
    pub final_decision: Option<String>,
    pub status: String,
    pub trace: Option<String>,
    /// For rejected rows: why the row was excluded from scoring
    pub input_error: Option<String>,
    /// For rejected rows: 1-based line in the input file
    pub input_line: Option<u64>,
}

impl ClaimResultRow {
    /// Flattens one processed dossier
    pub fn from_dossier(dossier: &ClaimDossier) -> Self {
        let claim = &dossier.claim;
        let (review_reason, reviewer_notified) = match dossier.review() {
            ReviewState::NotRequired => (None, None),
            ReviewState::Pending {
                reason, notified, ..
            } => (Some(reason.label().to_string()), Some(*notified)),
            ReviewState::Resolved {
                reason, notified, ..
            } => (Some(reason.label().to_string()), Some(*notified)),
        };
        let human = dossier.reviewer_override();

        Self {
            claim_number: Some(claim.claim_number.clone()),
            policy_number: Some(claim.policy_number.clone()),
            purchase_date: Some(claim.purchase_date),
            claim_date: Some(claim.claim_date),
            claimed_amount: Some(claim.claimed_amount.amount()),
            anomaly_score: dossier.anomaly().map(|a| a.score),
            risk_bucket: dossier.anomaly().map(|a| a.bucket.to_string()),
            anomaly_flag: dossier.anomaly().map(|a| a.flagged),
            anomaly_features: dossier
                .anomaly()
                .and_then(|a| serde_json::to_string(&a.field_scores).ok()),
            policy_coverage: dossier.coverage().map(|c| c.ruling.to_string()),
            policy_summary: dossier.coverage().map(|c| c.summary.clone()),
            policy_context: dossier.retrieval().map(|r| r.joined_text()),
            fraud_score: dossier.fraud().map(|f| f.score),
            fraud_reasons: dossier.fraud().map(|f| f.reasons.join("; ")),
            evidence_summary: dossier.evidence().map(|e| e.summary.clone()),
            decision: dossier.decision().map(|d| d.verdict.to_string()),
            decision_rationale: dossier.decision().map(|d| d.rationale.clone()),
            decision_confidence: dossier.decision().map(|d| d.confidence),
            review_reason,
            reviewer_notified,
            human_decision: human.map(|o| o.verdict.to_string()),
            human_comment: human.and_then(|o| o.comment.clone()),
            final_decision: dossier.final_verdict().map(|v| v.to_string()),
            status: dossier.status().as_str().to_string(),
            trace: Some(
                dossier
                    .trace()
                    .iter()
                    .map(|e| format!("[{}] {}", e.stage, e.message))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            input_error: None,
            input_line: None,
        }
    }

    /// Row for an input line that failed validation
    pub fn from_reject(reject: &RejectedRow) -> Self {
        Self {
            claim_number: reject.claim_number.clone(),
            policy_number: None,
            purchase_date: None,
            claim_date: None,
            claimed_amount: None,
            anomaly_score: None,
            risk_bucket: None,
            anomaly_flag: None,
            anomaly_features: None,
            policy_coverage: None,
            policy_summary: None,
            policy_context: None,
            fraud_score: None,
            fraud_reasons: None,
            evidence_summary: None,
            decision: None,
            decision_rationale: None,
            decision_confidence: None,
            review_reason: None,
            reviewer_notified: None,
            human_decision: None,
            human_comment: None,
            final_decision: None,
            status: TriageStatus::CorrectionRequired.as_str().to_string(),
            trace: None,
            input_error: Some(reject.reason.clone()),
            input_line: Some(reject.line),
        }
    }
}

/// Aggregate counts for one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub approved: usize,
    pub declined: usize,
    pub manual_review: usize,
    pub correction_required: usize,
    pub anomaly_flagged: usize,
    pub average_fraud_score: Option<f64>,
}

/// The full outcome of one batch run
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub id: BatchId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    dossiers: Vec<ClaimDossier>,
    rejects: Vec<RejectedRow>,
}

impl BatchReport {
    pub fn new(
        dossiers: Vec<ClaimDossier>,
        rejects: Vec<RejectedRow>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BatchId::new_v7(),
            started_at,
            finished_at,
            dossiers,
            rejects,
        }
    }

    pub fn dossiers(&self) -> &[ClaimDossier] {
        &self.dossiers
    }

    pub fn rejects(&self) -> &[RejectedRow] {
        &self.rejects
    }

    /// The results table: processed claims in input order, then rejected
    /// rows
    pub fn rows(&self) -> Vec<ClaimResultRow> {
        self.dossiers
            .iter()
            .map(ClaimResultRow::from_dossier)
            .chain(self.rejects.iter().map(ClaimResultRow::from_reject))
            .collect()
    }

    /// Dossiers waiting on a reviewer
    pub fn pending_review(&self) -> Vec<&ClaimDossier> {
        self.dossiers
            .iter()
            .filter(|d| matches!(d.review(), ReviewState::Pending { .. }))
            .collect()
    }

    pub fn summary(&self) -> BatchSummary {
        let rows = self.rows();
        let mut approved = 0;
        let mut declined = 0;
        let mut manual_review = 0;
        let mut correction_required = 0;
        let mut anomaly_flagged = 0;
        let mut fraud_sum = 0.0;
        let mut fraud_count = 0usize;

        for row in &rows {
            match row.status.as_str() {
                "approved" => approved += 1,
                "declined" => declined += 1,
                "manual_review" => manual_review += 1,
                "correction_required" => correction_required += 1,
                _ => {}
            }
            if row.anomaly_flag == Some(true) {
                anomaly_flagged += 1;
            }
            if let Some(score) = row.fraud_score {
                fraud_sum += score;
                fraud_count += 1;
            }
        }

        BatchSummary {
            total: rows.len(),
            approved,
            declined,
            manual_review,
            correction_required,
            anomaly_flagged,
            average_fraud_score: (fraud_count > 0).then(|| fraud_sum / fraud_count as f64),
        }
    }

    /// Applies a reviewer override to a claim pending review
    ///
    /// Returns the refreshed result row for the claim.
    pub fn apply_override(
        &mut self,
        claim_number: &str,
        verdict: DecisionVerdict,
        reviewer: &str,
        comment: Option<String>,
    ) -> Result<ClaimResultRow, AdjudicationError> {
        let dossier = self
            .dossiers
            .iter_mut()
            .find(|d| d.claim.claim_number == claim_number)
            .ok_or_else(|| AdjudicationError::ClaimNotFound(claim_number.to_string()))?;

        let decision = ReviewerOverride::new(verdict, reviewer, comment)?;
        dossier.apply_override(decision)?;
        Ok(ClaimResultRow::from_dossier(dossier))
    }

    /// Writes the results table as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), AdjudicationError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in self.rows() {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
