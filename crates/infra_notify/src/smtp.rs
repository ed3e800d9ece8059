//! SMTP escalation mail

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, warn};

use core_kernel::{DomainPort, PortError};
use domain_adjudication::{EscalationNotice, ReviewerNotifier};

/// SMTP connection and addressing configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address
    pub from: String,
    /// Reviewer address escalations are sent to
    pub to: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: String::new(),
            to: String::new(),
        }
    }
}

/// Sends escalation notices to the reviewer inbox over SMTP (STARTTLS)
#[derive(Debug)]
pub struct SmtpNotifier {
    config: SmtpConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Builds the notifier; address and relay problems surface here so a
    /// misconfiguration is visible at startup rather than mid-batch
    pub fn new(config: SmtpConfig) -> Result<Self, PortError> {
        let from: Mailbox = config.from.parse().map_err(|_| {
            PortError::configuration(format!("invalid sender address {:?}", config.from))
        })?;
        let to: Mailbox = config.to.parse().map_err(|_| {
            PortError::configuration(format!("invalid reviewer address {:?}", config.to))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|err| {
                PortError::configuration(format!("invalid SMTP relay {:?}: {err}", config.host))
            })?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            config,
            transport,
            from,
            to,
        })
    }

    pub fn reviewer_address(&self) -> &str {
        &self.config.to
    }
}

/// Renders the escalation mail body
pub fn render_body(notice: &EscalationNotice) -> String {
    let mut lines = vec![
        format!("Claim ID: {}", notice.claim_number),
        format!("Decision: {}", notice.decision),
        format!(
            "Fraud score: {}",
            notice
                .fraud_score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "n/a".to_string())
        ),
        format!(
            "Risk bucket: {}",
            notice.risk_bucket.as_deref().unwrap_or("unknown")
        ),
        String::new(),
        "Notes:".to_string(),
        if notice.notes.is_empty() {
            "(none)".to_string()
        } else {
            notice.notes.clone()
        },
    ];

    if let Some(summary) = &notice.evidence_summary {
        lines.push(String::new());
        lines.push("Evidence summary:".to_string());
        lines.push(summary.clone());
    }

    lines.join("\n")
}

/// Subject line for an escalation mail
pub fn render_subject(notice: &EscalationNotice) -> String {
    format!("[Review] Claim {} needs a decision", notice.claim_number)
}

impl DomainPort for SmtpNotifier {}

#[async_trait]
impl ReviewerNotifier for SmtpNotifier {
    async fn notify(&self, notice: &EscalationNotice) -> Result<(), PortError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(render_subject(notice))
            .header(ContentType::TEXT_PLAIN)
            .body(render_body(notice))
            .map_err(|err| {
                PortError::internal(format!("failed to build escalation mail: {err}"))
            })?;

        match self.transport.send(message).await {
            Ok(_) => {
                debug!(claim = %notice.claim_number, to = %self.config.to, "Escalation mail sent");
                Ok(())
            }
            Err(err) => {
                warn!(claim = %notice.claim_number, error = %err, "Escalation mail failed");
                Err(PortError::Connection {
                    message: format!("SMTP delivery failed: {err}"),
                    source: Some(Box::new(err)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> EscalationNotice {
        EscalationNotice {
            claim_number: "WC-77".to_string(),
            decision: "escalate".to_string(),
            fraud_score: Some(81.25),
            risk_bucket: Some("high".to_string()),
            notes: "Flagged for human review based on coverage=unclear.".to_string(),
            evidence_summary: Some("High anomaly score on claimed_amount.".to_string()),
        }
    }

    #[test]
    fn subject_names_the_claim() {
        assert_eq!(render_subject(&notice()), "[Review] Claim WC-77 needs a decision");
    }

    #[test]
    fn body_carries_scores_and_summary() {
        let body = render_body(&notice());
        assert!(body.contains("Claim ID: WC-77"));
        assert!(body.contains("Fraud score: 81.2"));
        assert!(body.contains("Risk bucket: high"));
        assert!(body.contains("Evidence summary:"));
    }

    #[test]
    fn body_handles_missing_fields() {
        let bare = EscalationNotice {
            claim_number: "WC-1".to_string(),
            decision: "escalate".to_string(),
            fraud_score: None,
            risk_bucket: None,
            notes: String::new(),
            evidence_summary: None,
        };
        let body = render_body(&bare);
        assert!(body.contains("Fraud score: n/a"));
        assert!(body.contains("Risk bucket: unknown"));
        assert!(body.contains("(none)"));
        assert!(!body.contains("Evidence summary:"));
    }

    #[test]
    fn invalid_addresses_are_rejected_at_construction() {
        let err = SmtpNotifier::new(SmtpConfig {
            host: "smtp.example.com".to_string(),
            from: "not-an-address".to_string(),
            to: "reviewer@example.com".to_string(),
            ..SmtpConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, PortError::Configuration { .. }));
    }
}
