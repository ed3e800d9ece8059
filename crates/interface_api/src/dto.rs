//! Request and response data transfer objects

use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_adjudication::{BatchSummary, ClaimResultRow};
use domain_claims::DecisionVerdict;

/// Request to run the pipeline over a claims table
#[derive(Debug, Deserialize, Validate)]
pub struct RunBatchRequest {
    /// Claims table as CSV text, header row included
    #[validate(length(min = 1, message = "claims_csv must not be empty"))]
    pub claims_csv: String,
}

/// Response after a batch run completes
#[derive(Debug, Serialize)]
pub struct BatchCreatedResponse {
    pub batch_id: String,
    pub summary: BatchSummary,
}

/// Full batch results
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub batch_id: String,
    pub summary: BatchSummary,
    pub rows: Vec<ClaimResultRow>,
}

/// Claims waiting on a reviewer
#[derive(Debug, Serialize)]
pub struct FlaggedResponse {
    pub batch_id: String,
    pub claims: Vec<ClaimResultRow>,
}

/// Reviewer override submission
#[derive(Debug, Deserialize, Validate)]
pub struct OverrideRequest {
    /// "approve" or "decline"
    pub decision: String,
    /// Reviewer identity, recorded on the decision
    #[validate(email(message = "reviewer must be an email address"))]
    pub reviewer: String,
    #[validate(length(max = 2000, message = "comment is limited to 2000 characters"))]
    pub comment: Option<String>,
}

impl OverrideRequest {
    /// Parses the decision field into a reviewer verdict
    pub fn verdict(&self) -> Option<DecisionVerdict> {
        match self.decision.trim().to_lowercase().as_str() {
            "approve" => Some(DecisionVerdict::Approve),
            "decline" | "deny" => Some(DecisionVerdict::Decline),
            _ => None,
        }
    }
}

/// Override outcome: the refreshed result row
#[derive(Debug, Serialize)]
pub struct OverrideResponse {
    pub claim: ClaimResultRow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_verdict_parsing() {
        let request = OverrideRequest {
            decision: " Approve ".to_string(),
            reviewer: "reviewer@example.com".to_string(),
            comment: None,
        };
        assert_eq!(request.verdict(), Some(DecisionVerdict::Approve));

        let request = OverrideRequest {
            decision: "escalate".to_string(),
            reviewer: "reviewer@example.com".to_string(),
            comment: None,
        };
        assert_eq!(request.verdict(), None);
    }

    #[test]
    fn override_request_validates_reviewer_email() {
        let request = OverrideRequest {
            decision: "approve".to_string(),
            reviewer: "not-an-email".to_string(),
            comment: None,
        };
        assert!(request.validate().is_err());
    }
}
