//! Claim Adjudication Domain
//!
//! Sequences the triage stages over each claim: anomaly scoring, policy
//! retrieval, the policy-check and fraud-scoring agents, evidence
//! assembly, and the final decision, with human-in-the-loop escalation.
//!
//! # Pipeline
//!
//! ```text
//! anomaly -> retrieval -> policy check -> fraud -> evidence -> decision
//!                                                                |
//!                                     escalate / any failure -> review
//! ```
//!
//! Every model call goes through [`ports::LanguageModelPort`]; any failure
//! or unparseable reply routes the claim to manual review. A claim is
//! never auto-approved on a failed evaluation.

pub mod ports;
pub mod verdict;
pub mod prompts;
pub mod evidence;
pub mod dossier;
pub mod pipeline;
pub mod batch;
pub mod report;
pub mod error;

pub use ports::{CompletionRequest, EscalationNotice, LanguageModelPort, ReviewerNotifier};
pub use verdict::{CoverageRuling, CoverageVerdict, FraudAssessment, ReplyParseError};
pub use evidence::EvidenceBundle;
pub use dossier::{ClaimDossier, DossierError, PipelineStage, ReviewReason, ReviewState};
pub use pipeline::{ClaimPipeline, PipelineConfig};
pub use report::{BatchReport, BatchSummary, ClaimResultRow};
pub use error::AdjudicationError;
