//! Evidence bundle assembly
//!
//! Pure aggregation: merges the anomaly assessment, retrieved context,
//! coverage verdict, and fraud assessment into one structured bundle with
//! a deterministically rendered summary. No external calls.

use serde::{Deserialize, Serialize};

use domain_anomaly::AnomalyAssessment;
use domain_claims::ClaimRecord;
use domain_policy::{RetrievalWarning, RetrievedContext};

use crate::verdict::{CoverageVerdict, FraudAssessment};

/// Structured evidence handed to the decision agent and to reviewers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub anomaly: AnomalyAssessment,
    pub coverage: CoverageVerdict,
    pub fraud: FraudAssessment,
    /// How many policy passages supported the coverage check
    pub passages_cited: usize,
    pub retrieval_warning: Option<RetrievalWarning>,
    /// Rendered text summary of the bundle
    pub summary: String,
}

impl EvidenceBundle {
    /// Assembles the bundle from the prior stages' outputs
    pub fn assemble(
        claim: &ClaimRecord,
        anomaly: &AnomalyAssessment,
        retrieval: &RetrievedContext,
        coverage: &CoverageVerdict,
        fraud: &FraudAssessment,
    ) -> Self {
        let summary = render_summary(claim, anomaly, retrieval, coverage, fraud);
        Self {
            anomaly: anomaly.clone(),
            coverage: coverage.clone(),
            fraud: fraud.clone(),
            passages_cited: retrieval.passages.len(),
            retrieval_warning: retrieval.warning,
            summary,
        }
    }
}

fn render_summary(
    claim: &ClaimRecord,
    anomaly: &AnomalyAssessment,
    retrieval: &RetrievedContext,
    coverage: &CoverageVerdict,
    fraud: &FraudAssessment,
) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Claim {} against policy {}: {} claimed {} days after purchase.",
        claim.claim_number,
        claim.policy_number,
        claim.claimed_amount,
        claim.days_in_service(),
    ));

    if let Some(part) = &claim.part_replaced {
        lines.push(format!("Component: {part}."));
    }

    lines.push(format!(
        "Coverage ruling: {} ({} policy passages consulted). {}",
        coverage.ruling,
        retrieval.passages.len(),
        coverage.summary,
    ));

    if let Some(warning) = retrieval.warning {
        lines.push(format!("Retrieval warning: {warning}."));
    }

    lines.push(format!(
        "Anomaly score {:.2} ({} risk){}.",
        anomaly.score,
        anomaly.bucket,
        if anomaly.flagged {
            "; statistical outlier flagged"
        } else {
            ""
        },
    ));

    lines.push(format!("Fraud likelihood {:.1}/100.", fraud.score));
    for reason in &fraud.reasons {
        lines.push(format!("- {reason}"));
    }
    for rule in &coverage.key_rules {
        lines.push(format!("- {rule}"));
    }

    lines.join("\n")
}
