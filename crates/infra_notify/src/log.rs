//! Log-only notifier
//!
//! Used when no SMTP credentials are configured: the escalation still
//! lands in the structured log so an operator can follow up.

use async_trait::async_trait;
use tracing::info;

use core_kernel::{DomainPort, PortError};
use domain_adjudication::{EscalationNotice, ReviewerNotifier};

/// Notifier that records escalations in the log and always succeeds
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl DomainPort for LogNotifier {}

#[async_trait]
impl ReviewerNotifier for LogNotifier {
    async fn notify(&self, notice: &EscalationNotice) -> Result<(), PortError> {
        info!(
            claim = %notice.claim_number,
            decision = %notice.decision,
            fraud_score = ?notice.fraud_score,
            risk_bucket = ?notice.risk_bucket,
            "Claim escalated for human review (notification not configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        let notice = EscalationNotice {
            claim_number: "WC-1".to_string(),
            decision: "escalate".to_string(),
            fraud_score: None,
            risk_bucket: None,
            notes: String::new(),
            evidence_summary: None,
        };
        assert!(notifier.notify(&notice).await.is_ok());
    }
}
