//! Ports consumed by the adjudication pipeline
//!
//! The language model is reachable only through [`LanguageModelPort`]: one
//! prompt in, one text reply out. Timeouts, credential handling, and retry
//! live behind the port, so the pipeline sees every failure as a
//! `PortError` and applies the same fail-closed routing to all of them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, PortError};

/// A single model exchange: system instructions plus user content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Narrow capability: evaluate claim evidence, return text
///
/// Implementations must enforce a per-call timeout and map transport
/// failures onto `PortError`.
#[async_trait]
pub trait LanguageModelPort: DomainPort {
    async fn complete(&self, request: CompletionRequest) -> Result<String, PortError>;
}

/// Escalation details delivered to the reviewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationNotice {
    pub claim_number: String,
    pub decision: String,
    pub fraud_score: Option<f64>,
    pub risk_bucket: Option<String>,
    pub notes: String,
    pub evidence_summary: Option<String>,
}

/// Notification capability for human-in-the-loop review
///
/// Failures are reported back to the caller but must never abort the
/// batch; the pipeline records the outcome on the dossier.
#[async_trait]
pub trait ReviewerNotifier: DomainPort {
    async fn notify(&self, notice: &EscalationNotice) -> Result<(), PortError>;
}
