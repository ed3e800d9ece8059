//! Custom assertion helpers for pipeline outcomes

use domain_adjudication::{ClaimDossier, ReviewState};
use domain_claims::TriageStatus;

/// Asserts the claim failed closed: manual review, no automated approval
///
/// Panics with a descriptive message otherwise.
pub fn assert_failed_closed(dossier: &ClaimDossier) {
    assert_eq!(
        dossier.status(),
        TriageStatus::ManualReview,
        "expected manual_review for claim {}, got {}",
        dossier.claim.claim_number,
        dossier.status()
    );
    assert!(
        matches!(dossier.review(), ReviewState::Pending { .. }),
        "expected pending review for claim {}",
        dossier.claim.claim_number
    );
    assert_ne!(
        dossier.status(),
        TriageStatus::Approved,
        "fail-closed claim {} must never be approved",
        dossier.claim.claim_number
    );
}

/// Asserts the claim completed with the given final status
pub fn assert_status(dossier: &ClaimDossier, expected: TriageStatus) {
    assert_eq!(
        dossier.status(),
        expected,
        "claim {} finished as {} (expected {expected})",
        dossier.claim.claim_number,
        dossier.status()
    );
}

/// Asserts every listed stage left at least one trace event
pub fn assert_traced_stages(
    dossier: &ClaimDossier,
    stages: &[domain_adjudication::PipelineStage],
) {
    for stage in stages {
        assert!(
            dossier.trace().iter().any(|event| event.stage == *stage),
            "claim {} has no trace for stage {stage}",
            dossier.claim.claim_number
        );
    }
}
