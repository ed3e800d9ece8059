//! The claim dossier: an append-only record of pipeline outputs
//!
//! Each stage's output is recorded exactly once and only after its
//! predecessor's output is present. Violations are errors, not silent
//! overwrites; the pipeline treats them like any other stage failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::PortError;
use domain_anomaly::AnomalyAssessment;
use domain_claims::{AgentDecision, ClaimRecord, ReviewerOverride, TriageStatus};
use domain_policy::RetrievedContext;

use crate::evidence::EvidenceBundle;
use crate::verdict::{CoverageVerdict, FraudAssessment};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    AnomalyScoring,
    PolicyRetrieval,
    PolicyCheck,
    FraudScoring,
    EvidenceAssembly,
    Decision,
    Review,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::AnomalyScoring => "anomaly_scoring",
            PipelineStage::PolicyRetrieval => "policy_retrieval",
            PipelineStage::PolicyCheck => "policy_check",
            PipelineStage::FraudScoring => "fraud_scoring",
            PipelineStage::EvidenceAssembly => "evidence_assembly",
            PipelineStage::Decision => "decision",
            PipelineStage::Review => "review",
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a claim requires human review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReviewReason {
    /// The decision agent chose to escalate
    Escalated,
    /// The model or its transport failed
    ModelUnavailable { stage: PipelineStage, detail: String },
    /// The model call timed out
    CallTimeout { stage: PipelineStage, detail: String },
    /// Credentials are missing or rejected
    MissingCredentials { detail: String },
    /// The model replied with something that does not parse
    UnparseableReply { stage: PipelineStage, detail: String },
    /// The pipeline itself misbehaved (stage recorded twice, out of order)
    InternalError { detail: String },
}

impl ReviewReason {
    /// Maps a port failure during `stage` onto the review reason recorded
    /// for the claim
    pub fn from_port_error(stage: PipelineStage, error: &PortError) -> Self {
        match error {
            PortError::Timeout { .. } => ReviewReason::CallTimeout {
                stage,
                detail: error.to_string(),
            },
            PortError::Unauthorized { .. } | PortError::Configuration { .. } => {
                ReviewReason::MissingCredentials {
                    detail: error.to_string(),
                }
            }
            PortError::Transformation { .. } => ReviewReason::UnparseableReply {
                stage,
                detail: error.to_string(),
            },
            _ => ReviewReason::ModelUnavailable {
                stage,
                detail: error.to_string(),
            },
        }
    }

    /// Short label used in exports
    pub fn label(&self) -> &'static str {
        match self {
            ReviewReason::Escalated => "escalated",
            ReviewReason::ModelUnavailable { .. } => "model_unavailable",
            ReviewReason::CallTimeout { .. } => "call_timeout",
            ReviewReason::MissingCredentials { .. } => "missing_credentials",
            ReviewReason::UnparseableReply { .. } => "unparseable_reply",
            ReviewReason::InternalError { .. } => "internal_error",
        }
    }
}

/// Human-review state of a claim
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReviewState {
    /// The automated decision stands
    #[default]
    NotRequired,
    /// Waiting on a reviewer
    Pending {
        reason: ReviewReason,
        notified: bool,
        notify_error: Option<String>,
    },
    /// A reviewer supplied an override
    Resolved {
        reason: ReviewReason,
        notified: bool,
        decision: ReviewerOverride,
    },
}

/// One trace entry per stage event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEvent {
    pub stage: PipelineStage,
    pub at: DateTime<Utc>,
    pub message: String,
}

/// Errors raised by the dossier's append-only discipline
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DossierError {
    #[error("Stage {0} already recorded")]
    StageAlreadyRecorded(PipelineStage),

    #[error("Stage {stage} requires {requires} to be recorded first")]
    PredecessorMissing {
        stage: PipelineStage,
        requires: PipelineStage,
    },

    #[error("Claim is not pending review")]
    NotPendingReview,

    #[error("Claim review was already resolved")]
    ReviewAlreadyResolved,
}

/// Append-only record of one claim's journey through the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimDossier {
    pub claim: ClaimRecord,
    anomaly: Option<AnomalyAssessment>,
    retrieval: Option<RetrievedContext>,
    coverage: Option<CoverageVerdict>,
    fraud: Option<FraudAssessment>,
    evidence: Option<EvidenceBundle>,
    decision: Option<AgentDecision>,
    review: ReviewState,
    trace: Vec<TraceEvent>,
}

impl ClaimDossier {
    pub fn new(claim: ClaimRecord) -> Self {
        Self {
            claim,
            anomaly: None,
            retrieval: None,
            coverage: None,
            fraud: None,
            evidence: None,
            decision: None,
            review: ReviewState::NotRequired,
            trace: Vec::new(),
        }
    }

    pub fn anomaly(&self) -> Option<&AnomalyAssessment> {
        self.anomaly.as_ref()
    }

    pub fn retrieval(&self) -> Option<&RetrievedContext> {
        self.retrieval.as_ref()
    }

    pub fn coverage(&self) -> Option<&CoverageVerdict> {
        self.coverage.as_ref()
    }

    pub fn fraud(&self) -> Option<&FraudAssessment> {
        self.fraud.as_ref()
    }

    pub fn evidence(&self) -> Option<&EvidenceBundle> {
        self.evidence.as_ref()
    }

    pub fn decision(&self) -> Option<&AgentDecision> {
        self.decision.as_ref()
    }

    pub fn review(&self) -> &ReviewState {
        &self.review
    }

    pub fn trace(&self) -> &[TraceEvent] {
        &self.trace
    }

    /// The reviewer override, when one was applied
    pub fn reviewer_override(&self) -> Option<&ReviewerOverride> {
        match &self.review {
            ReviewState::Resolved { decision, .. } => Some(decision),
            _ => None,
        }
    }

    /// Final status: the override wins, then pending review, then the
    /// agent decision; a claim that finished without any of those failed
    /// closed.
    pub fn status(&self) -> TriageStatus {
        match &self.review {
            ReviewState::Resolved { decision, .. } => TriageStatus::from_verdict(decision.verdict),
            ReviewState::Pending { .. } => TriageStatus::ManualReview,
            ReviewState::NotRequired => self
                .decision
                .as_ref()
                .map(|d| TriageStatus::from_verdict(d.verdict))
                .unwrap_or(TriageStatus::ManualReview),
        }
    }

    /// The verdict to report: override first, otherwise the agent's
    pub fn final_verdict(&self) -> Option<domain_claims::DecisionVerdict> {
        domain_claims::final_verdict(self.decision.as_ref(), self.reviewer_override())
    }

    pub fn push_trace(&mut self, stage: PipelineStage, message: impl Into<String>) {
        self.trace.push(TraceEvent {
            stage,
            at: Utc::now(),
            message: message.into(),
        });
    }

    pub fn record_anomaly(&mut self, assessment: AnomalyAssessment) -> Result<(), DossierError> {
        if self.anomaly.is_some() {
            return Err(DossierError::StageAlreadyRecorded(
                PipelineStage::AnomalyScoring,
            ));
        }
        self.anomaly = Some(assessment);
        Ok(())
    }

    pub fn record_retrieval(&mut self, context: RetrievedContext) -> Result<(), DossierError> {
        if self.anomaly.is_none() {
            return Err(DossierError::PredecessorMissing {
                stage: PipelineStage::PolicyRetrieval,
                requires: PipelineStage::AnomalyScoring,
            });
        }
        if self.retrieval.is_some() {
            return Err(DossierError::StageAlreadyRecorded(
                PipelineStage::PolicyRetrieval,
            ));
        }
        self.retrieval = Some(context);
        Ok(())
    }

    pub fn record_coverage(&mut self, verdict: CoverageVerdict) -> Result<(), DossierError> {
        if self.retrieval.is_none() {
            return Err(DossierError::PredecessorMissing {
                stage: PipelineStage::PolicyCheck,
                requires: PipelineStage::PolicyRetrieval,
            });
        }
        if self.coverage.is_some() {
            return Err(DossierError::StageAlreadyRecorded(PipelineStage::PolicyCheck));
        }
        self.coverage = Some(verdict);
        Ok(())
    }

    pub fn record_fraud(&mut self, assessment: FraudAssessment) -> Result<(), DossierError> {
        if self.coverage.is_none() {
            return Err(DossierError::PredecessorMissing {
                stage: PipelineStage::FraudScoring,
                requires: PipelineStage::PolicyCheck,
            });
        }
        if self.fraud.is_some() {
            return Err(DossierError::StageAlreadyRecorded(
                PipelineStage::FraudScoring,
            ));
        }
        self.fraud = Some(assessment);
        Ok(())
    }

    pub fn record_evidence(&mut self, bundle: EvidenceBundle) -> Result<(), DossierError> {
        if self.fraud.is_none() {
            return Err(DossierError::PredecessorMissing {
                stage: PipelineStage::EvidenceAssembly,
                requires: PipelineStage::FraudScoring,
            });
        }
        if self.evidence.is_some() {
            return Err(DossierError::StageAlreadyRecorded(
                PipelineStage::EvidenceAssembly,
            ));
        }
        self.evidence = Some(bundle);
        Ok(())
    }

    pub fn record_decision(&mut self, decision: AgentDecision) -> Result<(), DossierError> {
        if self.evidence.is_none() {
            return Err(DossierError::PredecessorMissing {
                stage: PipelineStage::Decision,
                requires: PipelineStage::EvidenceAssembly,
            });
        }
        if self.decision.is_some() {
            return Err(DossierError::StageAlreadyRecorded(PipelineStage::Decision));
        }
        self.decision = Some(decision);
        Ok(())
    }

    /// Marks the claim as pending human review
    pub fn require_review(&mut self, reason: ReviewReason) -> Result<(), DossierError> {
        match &self.review {
            ReviewState::NotRequired => {
                self.review = ReviewState::Pending {
                    reason,
                    notified: false,
                    notify_error: None,
                };
                Ok(())
            }
            ReviewState::Pending { .. } => Err(DossierError::StageAlreadyRecorded(
                PipelineStage::Review,
            )),
            ReviewState::Resolved { .. } => Err(DossierError::ReviewAlreadyResolved),
        }
    }

    /// Records the outcome of the reviewer notification attempt
    pub fn record_notification(&mut self, result: Result<(), String>) -> Result<(), DossierError> {
        match &mut self.review {
            ReviewState::Pending {
                notified,
                notify_error,
                ..
            } => {
                match result {
                    Ok(()) => *notified = true,
                    Err(err) => *notify_error = Some(err),
                }
                Ok(())
            }
            _ => Err(DossierError::NotPendingReview),
        }
    }

    /// Applies a reviewer override to a pending claim
    pub fn apply_override(&mut self, decision: ReviewerOverride) -> Result<(), DossierError> {
        match std::mem::take(&mut self.review) {
            ReviewState::Pending {
                reason, notified, ..
            } => {
                self.push_trace(
                    PipelineStage::Review,
                    format!(
                        "override {} by {}",
                        decision.verdict, decision.reviewer
                    ),
                );
                self.review = ReviewState::Resolved {
                    reason,
                    notified,
                    decision,
                };
                Ok(())
            }
            other => {
                self.review = other;
                match &self.review {
                    ReviewState::Resolved { .. } => Err(DossierError::ReviewAlreadyResolved),
                    _ => Err(DossierError::NotPendingReview),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::{ClaimId, Currency, Money};
    use domain_anomaly::RiskBucket;
    use domain_claims::DecisionVerdict;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn dossier() -> ClaimDossier {
        ClaimDossier::new(ClaimRecord {
            id: ClaimId::new_v7(),
            claim_number: "WC-7".to_string(),
            policy_number: "PLCY-7".to_string(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            claim_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            claimed_amount: Money::new(dec!(400), Currency::USD),
            labor_cost: None,
            part_cost: None,
            mileage: None,
            previous_claims: None,
            product_model: None,
            part_replaced: None,
            description: "test".to_string(),
        })
    }

    fn assessment() -> AnomalyAssessment {
        AnomalyAssessment {
            score: 0.5,
            bucket: RiskBucket::Low,
            field_scores: BTreeMap::new(),
            flagged: false,
        }
    }

    #[test]
    fn stage_cannot_be_recorded_twice() {
        let mut d = dossier();
        d.record_anomaly(assessment()).unwrap();
        assert_eq!(
            d.record_anomaly(assessment()),
            Err(DossierError::StageAlreadyRecorded(
                PipelineStage::AnomalyScoring
            ))
        );
    }

    #[test]
    fn stage_cannot_run_before_predecessor() {
        let mut d = dossier();
        let err = d
            .record_retrieval(RetrievedContext::default())
            .unwrap_err();
        assert_eq!(
            err,
            DossierError::PredecessorMissing {
                stage: PipelineStage::PolicyRetrieval,
                requires: PipelineStage::AnomalyScoring,
            }
        );
    }

    #[test]
    fn status_fails_closed_without_a_decision() {
        let d = dossier();
        assert_eq!(d.status(), TriageStatus::ManualReview);
    }

    #[test]
    fn pending_review_dominates_any_decision() {
        let mut d = dossier();
        d.require_review(ReviewReason::Escalated).unwrap();
        assert_eq!(d.status(), TriageStatus::ManualReview);
    }

    #[test]
    fn override_resolves_review_and_status() {
        let mut d = dossier();
        d.require_review(ReviewReason::Escalated).unwrap();
        d.record_notification(Ok(())).unwrap();

        let human =
            ReviewerOverride::new(DecisionVerdict::Approve, "reviewer@example.com", None).unwrap();
        d.apply_override(human).unwrap();

        assert_eq!(d.status(), TriageStatus::Approved);
        assert_eq!(d.final_verdict(), Some(DecisionVerdict::Approve));
    }

    #[test]
    fn override_requires_pending_review() {
        let mut d = dossier();
        let human =
            ReviewerOverride::new(DecisionVerdict::Approve, "reviewer@example.com", None).unwrap();
        assert_eq!(
            d.apply_override(human),
            Err(DossierError::NotPendingReview)
        );
    }

    #[test]
    fn second_override_is_rejected() {
        let mut d = dossier();
        d.require_review(ReviewReason::Escalated).unwrap();
        let first =
            ReviewerOverride::new(DecisionVerdict::Approve, "a@example.com", None).unwrap();
        let second =
            ReviewerOverride::new(DecisionVerdict::Decline, "b@example.com", None).unwrap();

        d.apply_override(first).unwrap();
        assert_eq!(
            d.apply_override(second),
            Err(DossierError::ReviewAlreadyResolved)
        );
    }

    #[test]
    fn notification_failure_is_recorded_not_fatal() {
        let mut d = dossier();
        d.require_review(ReviewReason::Escalated).unwrap();
        d.record_notification(Err("smtp unreachable".to_string()))
            .unwrap();

        match d.review() {
            ReviewState::Pending {
                notified,
                notify_error,
                ..
            } => {
                assert!(!notified);
                assert_eq!(notify_error.as_deref(), Some("smtp unreachable"));
            }
            other => panic!("unexpected review state: {other:?}"),
        }
    }

    #[test]
    fn port_errors_map_to_review_reasons() {
        let timeout = PortError::timeout("complete", 30_000);
        assert!(matches!(
            ReviewReason::from_port_error(PipelineStage::PolicyCheck, &timeout),
            ReviewReason::CallTimeout { .. }
        ));

        let unauthorized = PortError::unauthorized("bad key");
        assert!(matches!(
            ReviewReason::from_port_error(PipelineStage::FraudScoring, &unauthorized),
            ReviewReason::MissingCredentials { .. }
        ));

        let parse = PortError::transformation("not json");
        assert!(matches!(
            ReviewReason::from_port_error(PipelineStage::Decision, &parse),
            ReviewReason::UnparseableReply { .. }
        ));
    }
}
