//! Prompt construction for the triage agents

use domain_anomaly::AnomalyAssessment;
use domain_claims::ClaimRecord;

use crate::evidence::EvidenceBundle;
use crate::ports::CompletionRequest;
use crate::verdict::CoverageVerdict;

const POLICY_CHECK_SYSTEM: &str = "\
You are a senior warranty engineer.
You will receive:
- Policy text snippets
- Claim data as JSON

Decide whether this claim is covered by the policy.
You MUST respond with JSON only (no markdown) with keys:
  coverage : one of 'covered', 'not_covered', 'unclear'
  summary  : a short natural-language explanation (3-5 sentences)
  key_rules: a list of short bullet strings naming the policy rules you used.";

const FRAUD_SYSTEM: &str = "\
You are a warranty fraud analyst.
Estimate the likelihood of fraud or abuse based on:
- the claim data
- policy coverage and summary
- statistical anomaly metrics (z-scores).

Interpret the anomaly score as:
  ~0: normal, 1-2: somewhat unusual, >2.5: highly unusual.

You MUST respond with STRICT JSON with keys:
  fraud_score: float in [0, 100]
  reasons    : list of short bullet strings explaining the score.";

const DECISION_SYSTEM: &str = "\
You are a senior warranty decision specialist.
You must decide whether to approve, decline, or escalate this claim for human review.

You MUST respond with STRICT JSON only, with keys:
  decision   : one of 'approve', 'decline', 'escalate'
  rationale  : short explanation (2-4 sentences)
  confidence : float in [0, 1] representing your confidence.";

/// Builds the retrieval query from the claim's descriptive fields
///
/// Falls back to the full claim JSON when none of the fields are present.
pub fn retrieval_query(claim: &ClaimRecord) -> String {
    let mut parts = Vec::new();
    if let Some(model) = &claim.product_model {
        parts.push(format!("product_model: {model}"));
    }
    if let Some(part) = &claim.part_replaced {
        parts.push(format!("part_replaced: {part}"));
    }
    if !claim.description.is_empty() {
        parts.push(format!("failure_description: {}", claim.description));
    }

    if parts.is_empty() {
        claim.to_prompt_json()
    } else {
        parts.join(" | ")
    }
}

/// Prompt for the policy-check agent
pub fn coverage_request(claim: &ClaimRecord, policy_context: &str) -> CompletionRequest {
    let user = format!(
        "Policy snippets:\n{policy_context}\n\n\
         Claim data:\n{}\n\n\
         Respond with STRICT JSON only.",
        claim.to_prompt_json()
    );
    CompletionRequest::new(POLICY_CHECK_SYSTEM, user)
}

/// Prompt for the fraud-scoring agent
pub fn fraud_request(
    claim: &ClaimRecord,
    coverage: &CoverageVerdict,
    anomaly: &AnomalyAssessment,
) -> CompletionRequest {
    let features = serde_json::to_string(&anomaly.field_scores).unwrap_or_default();
    let user = format!(
        "Claim data:\n{}\n\n\
         Policy coverage: {}\n\
         Policy summary: {}\n\n\
         Anomaly score (avg z-score): {:.4}\n\
         Risk bucket: {}\n\
         Per-field z-scores: {features}\n",
        claim.to_prompt_json(),
        coverage.ruling,
        coverage.summary,
        anomaly.score,
        anomaly.bucket,
    );
    CompletionRequest::new(FRAUD_SYSTEM, user)
}

/// Prompt for the decision agent
pub fn decision_request(claim: &ClaimRecord, evidence: &EvidenceBundle) -> CompletionRequest {
    let user = format!(
        "Claim data:\n{}\n\n\
         Policy coverage: {}\n\
         Policy summary:\n{}\n\n\
         Fraud score: {:.1}\n\
         Fraud reasons: {}\n\n\
         Anomaly score: {:.4}\n\
         Risk bucket: {}\n\
         Evidence summary:\n{}\n",
        claim.to_prompt_json(),
        evidence.coverage.ruling,
        evidence.coverage.summary,
        evidence.fraud.score,
        evidence.fraud.reasons.join("; "),
        evidence.anomaly.score,
        evidence.anomaly.bucket,
        evidence.summary,
    );
    CompletionRequest::new(DECISION_SYSTEM, user)
}
