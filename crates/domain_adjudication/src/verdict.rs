//! Structured agent verdicts and strict-JSON reply parsing
//!
//! Agents are instructed to answer with strict JSON. Replies are still
//! defended: Markdown code fences are stripped, verdict strings are
//! matched case-insensitively, and anything else is a parse error that
//! the pipeline converts into fail-closed routing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use domain_claims::DecisionVerdict;

/// Error raised when a model reply does not match the expected contract
#[derive(Debug, Error)]
pub enum ReplyParseError {
    #[error("Reply is not valid JSON: {detail}")]
    InvalidJson { detail: String },

    #[error("Unknown verdict value: {0:?}")]
    UnknownVerdict(String),
}

/// Strips Markdown code fences from a model reply
///
/// Handles ```json ... ``` and bare ``` fences; anything else is returned
/// trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    let inner = inner.trim_start();
    let inner = inner
        .strip_prefix("json")
        .or_else(|| inner.strip_prefix("JSON"))
        .unwrap_or(inner);
    inner.trim()
}

fn parse_json<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, ReplyParseError> {
    serde_json::from_str(strip_code_fences(raw)).map_err(|err| ReplyParseError::InvalidJson {
        detail: err.to_string(),
    })
}

/// Coverage ruling from the policy-check agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageRuling {
    Covered,
    NotCovered,
    Unclear,
    /// No policy context was available; compliance was not evaluated
    InsufficientContext,
}

impl CoverageRuling {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageRuling::Covered => "covered",
            CoverageRuling::NotCovered => "not_covered",
            CoverageRuling::Unclear => "unclear",
            CoverageRuling::InsufficientContext => "insufficient_context",
        }
    }
}

impl std::fmt::Display for CoverageRuling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct CoveragePayload {
    coverage: String,
    summary: Option<String>,
    #[serde(default)]
    key_rules: Vec<String>,
}

/// Output of the policy-check agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageVerdict {
    pub ruling: CoverageRuling,
    pub summary: String,
    /// Policy rules the model cited for its ruling
    pub key_rules: Vec<String>,
}

impl CoverageVerdict {
    /// Verdict recorded when retrieval produced no context
    pub fn insufficient_context(detail: impl std::fmt::Display) -> Self {
        Self {
            ruling: CoverageRuling::InsufficientContext,
            summary: format!("Compliance not evaluated: {detail}"),
            key_rules: Vec::new(),
        }
    }

    /// Parses the policy-check agent's strict-JSON reply
    pub fn from_reply(raw: &str) -> Result<Self, ReplyParseError> {
        let payload: CoveragePayload = parse_json(raw)?;
        let ruling = match payload.coverage.trim().to_lowercase().as_str() {
            "covered" => CoverageRuling::Covered,
            "not_covered" | "not covered" => CoverageRuling::NotCovered,
            "unclear" => CoverageRuling::Unclear,
            other => return Err(ReplyParseError::UnknownVerdict(other.to_string())),
        };
        Ok(Self {
            ruling,
            summary: payload.summary.unwrap_or_default(),
            key_rules: payload.key_rules,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FraudPayload {
    fraud_score: f64,
    #[serde(default)]
    reasons: Vec<String>,
}

/// Output of the fraud-scoring agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAssessment {
    /// Fraud likelihood in [0, 100]
    pub score: f64,
    pub reasons: Vec<String>,
}

impl FraudAssessment {
    /// Parses the fraud agent's strict-JSON reply, clamping the score
    pub fn from_reply(raw: &str) -> Result<Self, ReplyParseError> {
        let payload: FraudPayload = parse_json(raw)?;
        if !payload.fraud_score.is_finite() {
            return Err(ReplyParseError::UnknownVerdict(format!(
                "non-finite fraud_score {}",
                payload.fraud_score
            )));
        }
        Ok(Self {
            score: payload.fraud_score.clamp(0.0, 100.0),
            reasons: payload.reasons,
        })
    }
}

#[derive(Debug, Deserialize)]
struct DecisionPayload {
    decision: String,
    rationale: Option<String>,
    confidence: Option<f64>,
}

/// Parses the decision agent's strict-JSON reply
pub fn parse_decision_reply(
    raw: &str,
) -> Result<(DecisionVerdict, String, f64), ReplyParseError> {
    let payload: DecisionPayload = parse_json(raw)?;
    let verdict = match payload.decision.trim().to_lowercase().as_str() {
        "approve" => DecisionVerdict::Approve,
        "decline" | "deny" => DecisionVerdict::Decline,
        "escalate" | "escalate_hitl" => DecisionVerdict::Escalate,
        other => return Err(ReplyParseError::UnknownVerdict(other.to_string())),
    };
    Ok((
        verdict,
        payload.rationale.unwrap_or_default(),
        payload.confidence.unwrap_or(0.0),
    ))
}
