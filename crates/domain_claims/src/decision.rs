//! Decisions, triage status, and reviewer overrides

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::ReviewId;

use crate::error::ClaimError;

/// The decision an agent (or reviewer) can reach for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionVerdict {
    Approve,
    Decline,
    Escalate,
}

impl DecisionVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionVerdict::Approve => "approve",
            DecisionVerdict::Decline => "decline",
            DecisionVerdict::Escalate => "escalate",
        }
    }
}

impl std::fmt::Display for DecisionVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The automated decision produced by the decision agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDecision {
    pub verdict: DecisionVerdict,
    pub rationale: String,
    /// Model-reported confidence, clamped to [0, 1]
    pub confidence: f64,
    pub decided_at: DateTime<Utc>,
}

impl AgentDecision {
    pub fn new(verdict: DecisionVerdict, rationale: impl Into<String>, confidence: f64) -> Self {
        Self {
            verdict,
            rationale: rationale.into(),
            confidence: confidence.clamp(0.0, 1.0),
            decided_at: Utc::now(),
        }
    }
}

/// A reviewer's override of the automated decision
///
/// Overrides take precedence over the agent decision in every export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerOverride {
    pub id: ReviewId,
    pub verdict: DecisionVerdict,
    pub reviewer: String,
    pub comment: Option<String>,
    pub decided_at: DateTime<Utc>,
}

impl ReviewerOverride {
    /// Creates an override; only approve and decline are valid reviewer verdicts
    pub fn new(
        verdict: DecisionVerdict,
        reviewer: impl Into<String>,
        comment: Option<String>,
    ) -> Result<Self, ClaimError> {
        if verdict == DecisionVerdict::Escalate {
            return Err(ClaimError::InvalidOverrideVerdict(verdict.to_string()));
        }
        Ok(Self {
            id: ReviewId::new_v7(),
            verdict,
            reviewer: reviewer.into(),
            comment,
            decided_at: Utc::now(),
        })
    }
}

/// Final status of a claim after a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageStatus {
    /// Automated approval
    Approved,
    /// Automated decline
    Declined,
    /// Escalated or failed closed; waiting on a human
    ManualReview,
    /// Input row was malformed; needs manual entry correction
    CorrectionRequired,
}

impl TriageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageStatus::Approved => "approved",
            TriageStatus::Declined => "declined",
            TriageStatus::ManualReview => "manual_review",
            TriageStatus::CorrectionRequired => "correction_required",
        }
    }

    /// Resolves the status implied by a verdict
    pub fn from_verdict(verdict: DecisionVerdict) -> Self {
        match verdict {
            DecisionVerdict::Approve => TriageStatus::Approved,
            DecisionVerdict::Decline => TriageStatus::Declined,
            DecisionVerdict::Escalate => TriageStatus::ManualReview,
        }
    }
}

impl std::fmt::Display for TriageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the decision to report: the override when present, otherwise
/// the agent's verdict
pub fn final_verdict(
    agent: Option<&AgentDecision>,
    reviewer: Option<&ReviewerOverride>,
) -> Option<DecisionVerdict> {
    reviewer
        .map(|o| o.verdict)
        .or_else(|| agent.map(|d| d.verdict))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_decision_clamps_confidence() {
        let d = AgentDecision::new(DecisionVerdict::Approve, "covered", 1.7);
        assert_eq!(d.confidence, 1.0);

        let d = AgentDecision::new(DecisionVerdict::Decline, "excluded", -0.2);
        assert_eq!(d.confidence, 0.0);
    }

    #[test]
    fn override_rejects_escalate() {
        let result = ReviewerOverride::new(DecisionVerdict::Escalate, "lead@example.com", None);
        assert!(matches!(
            result,
            Err(ClaimError::InvalidOverrideVerdict(_))
        ));
    }

    #[test]
    fn override_takes_precedence() {
        let agent = AgentDecision::new(DecisionVerdict::Escalate, "unclear coverage", 0.4);
        let human =
            ReviewerOverride::new(DecisionVerdict::Decline, "lead@example.com", None).unwrap();

        assert_eq!(
            final_verdict(Some(&agent), Some(&human)),
            Some(DecisionVerdict::Decline)
        );
        assert_eq!(
            final_verdict(Some(&agent), None),
            Some(DecisionVerdict::Escalate)
        );
        assert_eq!(final_verdict(None, None), None);
    }

    #[test]
    fn status_taxonomy_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TriageStatus::ManualReview).unwrap(),
            "\"manual_review\""
        );
        assert_eq!(
            serde_json::to_string(&DecisionVerdict::Approve).unwrap(),
            "\"approve\""
        );
    }
}
