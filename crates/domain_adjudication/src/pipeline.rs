//! The claim pipeline: fixed-order stages with fail-closed routing

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use domain_anomaly::{AnomalyScorer, HistoricalProfile};
use domain_claims::{AgentDecision, ClaimRecord, DecisionVerdict, NumericField};
use domain_policy::PassageRetriever;

use crate::dossier::{ClaimDossier, DossierError, PipelineStage, ReviewReason};
use crate::evidence::EvidenceBundle;
use crate::ports::{EscalationNotice, LanguageModelPort, ReviewerNotifier};
use crate::prompts;
use crate::verdict::{CoverageVerdict, FraudAssessment};
use crate::verdict::parse_decision_reply;

/// Tunables for one pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Passages retrieved per claim for the policy check
    pub retrieval_top_k: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { retrieval_top_k: 4 }
    }
}

/// Sequences the triage stages for each claim
///
/// Holds only read-only shared state: the scorer configuration, the
/// passage retriever, and the two ports. Claims are processed one at a
/// time; nothing mutable crosses claims.
pub struct ClaimPipeline {
    model: Arc<dyn LanguageModelPort>,
    retriever: Arc<dyn PassageRetriever>,
    notifier: Arc<dyn ReviewerNotifier>,
    scorer: AnomalyScorer,
    config: PipelineConfig,
}

impl ClaimPipeline {
    pub fn new(
        model: Arc<dyn LanguageModelPort>,
        retriever: Arc<dyn PassageRetriever>,
        notifier: Arc<dyn ReviewerNotifier>,
        scorer: AnomalyScorer,
        config: PipelineConfig,
    ) -> Self {
        Self {
            model,
            retriever,
            notifier,
            scorer,
            config,
        }
    }

    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    /// Runs all stages for one claim
    ///
    /// Never fails: any stage failure routes the claim to manual review
    /// with the reason recorded on the dossier.
    pub async fn run_claim(
        &self,
        record: ClaimRecord,
        profile: &HistoricalProfile,
    ) -> ClaimDossier {
        let claim_number = record.claim_number.clone();
        let mut dossier = ClaimDossier::new(record);

        match self.execute(&mut dossier, profile).await {
            Ok(()) => {
                let escalated = matches!(
                    dossier.decision().map(|d| d.verdict),
                    Some(DecisionVerdict::Escalate)
                );
                if escalated {
                    info!(claim = %claim_number, "Decision agent escalated claim");
                    self.escalate(&mut dossier, ReviewReason::Escalated).await;
                }
            }
            Err(reason) => {
                warn!(
                    claim = %claim_number,
                    reason = reason.label(),
                    "Stage failed; routing claim to manual review"
                );
                self.escalate(&mut dossier, reason).await;
            }
        }

        dossier
    }

    async fn execute(
        &self,
        dossier: &mut ClaimDossier,
        profile: &HistoricalProfile,
    ) -> Result<(), ReviewReason> {
        // 1. Anomaly scoring (deterministic, local)
        let anomaly = self
            .scorer
            .assess(&numeric_values(&dossier.claim), profile);
        dossier.push_trace(
            PipelineStage::AnomalyScoring,
            format!(
                "score={:.4} bucket={} flagged={}",
                anomaly.score, anomaly.bucket, anomaly.flagged
            ),
        );
        dossier.record_anomaly(anomaly.clone()).map_err(internal)?;

        // 2. Policy retrieval (deterministic, local)
        let query = prompts::retrieval_query(&dossier.claim);
        let context = self.retriever.retrieve(&query, self.config.retrieval_top_k);
        dossier.push_trace(
            PipelineStage::PolicyRetrieval,
            match context.warning {
                Some(warning) => format!("no context: {warning}"),
                None => format!("{} passages retrieved", context.passages.len()),
            },
        );
        dossier.record_retrieval(context.clone()).map_err(internal)?;

        // 3. Policy check: no context means compliance is not evaluated
        let coverage = if context.is_empty() {
            let detail = context
                .warning
                .map(|w| w.to_string())
                .unwrap_or_else(|| "no policy context".to_string());
            CoverageVerdict::insufficient_context(detail)
        } else {
            let request = prompts::coverage_request(&dossier.claim, &context.joined_text());
            let reply = self
                .model
                .complete(request)
                .await
                .map_err(|e| ReviewReason::from_port_error(PipelineStage::PolicyCheck, &e))?;
            CoverageVerdict::from_reply(&reply).map_err(|e| ReviewReason::UnparseableReply {
                stage: PipelineStage::PolicyCheck,
                detail: e.to_string(),
            })?
        };
        dossier.push_trace(
            PipelineStage::PolicyCheck,
            format!("ruling={} rules_cited={}", coverage.ruling, coverage.key_rules.len()),
        );
        dossier.record_coverage(coverage.clone()).map_err(internal)?;

        // 4. Fraud scoring
        let request = prompts::fraud_request(&dossier.claim, &coverage, &anomaly);
        let reply = self
            .model
            .complete(request)
            .await
            .map_err(|e| ReviewReason::from_port_error(PipelineStage::FraudScoring, &e))?;
        let fraud = FraudAssessment::from_reply(&reply).map_err(|e| {
            ReviewReason::UnparseableReply {
                stage: PipelineStage::FraudScoring,
                detail: e.to_string(),
            }
        })?;
        dossier.push_trace(
            PipelineStage::FraudScoring,
            format!("score={:.1}", fraud.score),
        );
        dossier.record_fraud(fraud.clone()).map_err(internal)?;

        // 5. Evidence assembly (pure aggregation)
        let evidence =
            EvidenceBundle::assemble(&dossier.claim, &anomaly, &context, &coverage, &fraud);
        dossier.push_trace(PipelineStage::EvidenceAssembly, "bundle assembled");
        dossier.record_evidence(evidence.clone()).map_err(internal)?;

        // 6. Decision
        let request = prompts::decision_request(&dossier.claim, &evidence);
        let reply = self
            .model
            .complete(request)
            .await
            .map_err(|e| ReviewReason::from_port_error(PipelineStage::Decision, &e))?;
        let (verdict, rationale, confidence) =
            parse_decision_reply(&reply).map_err(|e| ReviewReason::UnparseableReply {
                stage: PipelineStage::Decision,
                detail: e.to_string(),
            })?;
        dossier.push_trace(
            PipelineStage::Decision,
            format!("verdict={verdict} confidence={confidence:.2}"),
        );
        dossier
            .record_decision(AgentDecision::new(verdict, rationale, confidence))
            .map_err(internal)?;

        Ok(())
    }

    /// Marks the claim for review and attempts reviewer notification
    ///
    /// Notification failures are recorded on the dossier, never raised.
    async fn escalate(&self, dossier: &mut ClaimDossier, reason: ReviewReason) {
        dossier.push_trace(
            PipelineStage::Review,
            format!("routed to manual review: {}", reason.label()),
        );

        if let Err(err) = dossier.require_review(reason) {
            // A dossier can only reach review once per run; anything else
            // is a bug worth surfacing in the trace.
            warn!(claim = %dossier.claim.claim_number, error = %err, "Could not mark claim for review");
            dossier.push_trace(PipelineStage::Review, format!("review marking failed: {err}"));
            return;
        }

        let notice = build_notice(dossier);
        let outcome = self
            .notifier
            .notify(&notice)
            .await
            .map_err(|e| e.to_string());

        match &outcome {
            Ok(()) => {
                debug!(claim = %dossier.claim.claim_number, "Reviewer notified");
                dossier.push_trace(PipelineStage::Review, "reviewer notified");
            }
            Err(err) => {
                warn!(claim = %dossier.claim.claim_number, error = %err, "Reviewer notification failed");
                dossier.push_trace(
                    PipelineStage::Review,
                    format!("reviewer notification failed: {err}"),
                );
            }
        }

        if let Err(err) = dossier.record_notification(outcome) {
            warn!(claim = %dossier.claim.claim_number, error = %err, "Could not record notification outcome");
        }
    }
}

/// Numeric field values for one claim, keyed by input column
pub fn numeric_values(record: &ClaimRecord) -> BTreeMap<String, f64> {
    NumericField::ALL
        .iter()
        .filter_map(|field| {
            record
                .numeric_value(*field)
                .map(|value| (field.column().to_string(), value))
        })
        .collect()
}

fn internal(err: DossierError) -> ReviewReason {
    ReviewReason::InternalError {
        detail: err.to_string(),
    }
}

fn build_notice(dossier: &ClaimDossier) -> EscalationNotice {
    let coverage = dossier
        .coverage()
        .map(|c| c.ruling.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let fraud_score = dossier.fraud().map(|f| f.score);
    let risk_bucket = dossier.anomaly().map(|a| a.bucket.to_string());

    EscalationNotice {
        claim_number: dossier.claim.claim_number.clone(),
        decision: dossier
            .decision()
            .map(|d| d.verdict.to_string())
            .unwrap_or_else(|| DecisionVerdict::Escalate.to_string()),
        fraud_score,
        risk_bucket: risk_bucket.clone(),
        notes: format!(
            "Flagged for human review based on coverage={}, fraud_score={}, risk_bucket={}.",
            coverage,
            fraud_score
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "n/a".to_string()),
            risk_bucket.unwrap_or_else(|| "unknown".to_string()),
        ),
        evidence_summary: dossier.evidence().map(|e| e.summary.clone()),
    }
}
