//! Pipeline behavior tests against a scripted language model
//!
//! The model port is scripted per test; retrieval runs against a real
//! in-memory corpus so the deterministic stages are exercised end to end.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{ClaimId, Currency, Money, PortError};
use domain_adjudication::batch::historical_profile;
use domain_adjudication::{
    ClaimPipeline, CompletionRequest, CoverageRuling, EscalationNotice, LanguageModelPort,
    PipelineConfig, ReviewReason, ReviewState, ReviewerNotifier,
};
use domain_anomaly::AnomalyScorer;
use domain_claims::{
    ClaimRecord, DecisionVerdict, LoadedBatch, RejectedRow, TriageStatus,
};
use domain_policy::{IndexRetriever, PassageIndex, PassageSplitter, PolicyCorpus};

const POLICY: &str = "\
Powertrain components including the engine and transmission are covered \
for 60 months. Wear items such as brake pads and wiper blades are \
excluded. Claims exceeding 5,000 dollars require prior authorization.";

struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, PortError>>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<String, PortError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
        })
    }
}

impl core_kernel::DomainPort for ScriptedModel {}

#[async_trait]
impl LanguageModelPort for ScriptedModel {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, PortError> {
        self.replies
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(PortError::internal("script exhausted")))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<EscalationNotice>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn count(&self) -> usize {
        self.notices.lock().expect("notice lock").len()
    }
}

impl core_kernel::DomainPort for RecordingNotifier {}

#[async_trait]
impl ReviewerNotifier for RecordingNotifier {
    async fn notify(&self, notice: &EscalationNotice) -> Result<(), PortError> {
        if self.fail {
            return Err(PortError::connection("smtp unreachable"));
        }
        self.notices
            .lock()
            .expect("notice lock")
            .push(notice.clone());
        Ok(())
    }
}

fn retriever_with_policy() -> Arc<IndexRetriever> {
    let corpus = PolicyCorpus::from_text(POLICY, &PassageSplitter::default());
    Arc::new(IndexRetriever::new(PassageIndex::build(&corpus)))
}

fn empty_retriever() -> Arc<IndexRetriever> {
    Arc::new(IndexRetriever::new(PassageIndex::build(&PolicyCorpus::empty())))
}

fn pipeline(
    model: Arc<ScriptedModel>,
    retriever: Arc<IndexRetriever>,
    notifier: Arc<RecordingNotifier>,
) -> ClaimPipeline {
    ClaimPipeline::new(
        model,
        retriever,
        notifier,
        AnomalyScorer::default(),
        PipelineConfig::default(),
    )
}

fn claim(number: &str, amount: i64) -> ClaimRecord {
    ClaimRecord {
        id: ClaimId::new_v7(),
        claim_number: number.to_string(),
        policy_number: "PLCY-1".to_string(),
        purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        claim_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        claimed_amount: Money::new(rust_decimal::Decimal::new(amount, 0), Currency::USD),
        labor_cost: None,
        part_cost: None,
        mileage: Some(30_000),
        previous_claims: Some(0),
        product_model: Some("Meridian GT".to_string()),
        part_replaced: Some("transmission".to_string()),
        description: "gear slippage under load".to_string(),
    }
}

fn coverage_reply(ruling: &str) -> Result<String, PortError> {
    Ok(format!(
        r#"{{"coverage": "{ruling}", "summary": "per powertrain section", "key_rules": ["60 month powertrain term"]}}"#
    ))
}

fn fraud_reply(score: f64) -> Result<String, PortError> {
    Ok(format!(
        r#"{{"fraud_score": {score}, "reasons": ["amount consistent with repair"]}}"#
    ))
}

fn decision_reply(decision: &str) -> Result<String, PortError> {
    Ok(format!(
        r#"{{"decision": "{decision}", "rationale": "clear case", "confidence": 0.9}}"#
    ))
}

#[tokio::test]
async fn approves_clean_claim_end_to_end() {
    let model = ScriptedModel::new(vec![
        coverage_reply("covered"),
        fraud_reply(8.0),
        decision_reply("approve"),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(model, retriever_with_policy(), notifier.clone());

    let record = claim("WC-1", 900);
    let profile = historical_profile(&[claim("WC-A", 800), claim("WC-B", 1000), record.clone()]);
    let dossier = pipeline.run_claim(record, &profile).await;

    assert_eq!(dossier.status(), TriageStatus::Approved);
    assert_eq!(dossier.final_verdict(), Some(DecisionVerdict::Approve));
    assert_eq!(dossier.coverage().unwrap().ruling, CoverageRuling::Covered);
    assert!(dossier.evidence().is_some());
    assert!(matches!(dossier.review(), ReviewState::NotRequired));
    assert_eq!(notifier.count(), 0);
    // Every stage left a trace entry
    assert!(dossier.trace().len() >= 6);
}

#[tokio::test]
async fn escalation_notifies_reviewer_and_pends() {
    let model = ScriptedModel::new(vec![
        coverage_reply("unclear"),
        fraud_reply(74.0),
        decision_reply("escalate"),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(model, retriever_with_policy(), notifier.clone());

    let record = claim("WC-2", 4_800);
    let profile = historical_profile(&[record.clone()]);
    let dossier = pipeline.run_claim(record, &profile).await;

    assert_eq!(dossier.status(), TriageStatus::ManualReview);
    assert_eq!(notifier.count(), 1);
    match dossier.review() {
        ReviewState::Pending {
            reason, notified, ..
        } => {
            assert_eq!(*reason, ReviewReason::Escalated);
            assert!(notified);
        }
        other => panic!("expected pending review, got {other:?}"),
    }
}

#[tokio::test]
async fn model_failure_fails_closed_never_approves() {
    let model = ScriptedModel::new(vec![Err(PortError::unauthorized("invalid API key"))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(model, retriever_with_policy(), notifier.clone());

    let record = claim("WC-3", 650);
    let profile = historical_profile(&[record.clone()]);
    let dossier = pipeline.run_claim(record, &profile).await;

    assert_eq!(dossier.status(), TriageStatus::ManualReview);
    assert!(dossier.decision().is_none());
    match dossier.review() {
        ReviewState::Pending { reason, .. } => {
            assert!(matches!(reason, ReviewReason::MissingCredentials { .. }));
        }
        other => panic!("expected pending review, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_reply_fails_closed() {
    let model = ScriptedModel::new(vec![
        coverage_reply("covered"),
        Ok("the fraud risk seems low to me".to_string()),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(model, retriever_with_policy(), notifier.clone());

    let record = claim("WC-4", 700);
    let profile = historical_profile(&[record.clone()]);
    let dossier = pipeline.run_claim(record, &profile).await;

    assert_eq!(dossier.status(), TriageStatus::ManualReview);
    assert!(dossier.fraud().is_none());
    match dossier.review() {
        ReviewState::Pending { reason, .. } => {
            assert!(matches!(reason, ReviewReason::UnparseableReply { .. }));
        }
        other => panic!("expected pending review, got {other:?}"),
    }
}

#[tokio::test]
async fn timeout_is_recorded_as_timeout() {
    let model = ScriptedModel::new(vec![Err(PortError::timeout("chat completion", 30_000))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(model, retriever_with_policy(), notifier.clone());

    let record = claim("WC-5", 700);
    let profile = historical_profile(&[record.clone()]);
    let dossier = pipeline.run_claim(record, &profile).await;

    assert_eq!(dossier.status(), TriageStatus::ManualReview);
    match dossier.review() {
        ReviewState::Pending { reason, .. } => {
            assert!(matches!(reason, ReviewReason::CallTimeout { .. }));
        }
        other => panic!("expected pending review, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_corpus_yields_insufficient_context_not_silent_pass() {
    // No coverage reply is scripted: the model must not be consulted for
    // the policy check when there is no context.
    let model = ScriptedModel::new(vec![fraud_reply(40.0), decision_reply("escalate")]);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(model, empty_retriever(), notifier.clone());

    let record = claim("WC-6", 700);
    let profile = historical_profile(&[record.clone()]);
    let dossier = pipeline.run_claim(record, &profile).await;

    let coverage = dossier.coverage().unwrap();
    assert_eq!(coverage.ruling, CoverageRuling::InsufficientContext);
    assert_ne!(dossier.status(), TriageStatus::Approved);
}

#[tokio::test]
async fn notification_failure_keeps_claim_pending() {
    let model = ScriptedModel::new(vec![
        coverage_reply("unclear"),
        fraud_reply(88.0),
        decision_reply("escalate"),
    ]);
    let notifier = Arc::new(RecordingNotifier::failing());
    let pipeline = pipeline(model, retriever_with_policy(), notifier.clone());

    let record = claim("WC-7", 9_000);
    let profile = historical_profile(&[record.clone()]);
    let dossier = pipeline.run_claim(record, &profile).await;

    assert_eq!(dossier.status(), TriageStatus::ManualReview);
    match dossier.review() {
        ReviewState::Pending {
            notified,
            notify_error,
            ..
        } => {
            assert!(!notified);
            assert!(notify_error.as_deref().unwrap_or_default().contains("smtp"));
        }
        other => panic!("expected pending review, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_report_covers_rejects_overrides_and_summary() {
    let model = ScriptedModel::new(vec![
        // WC-1: approve
        coverage_reply("covered"),
        fraud_reply(5.0),
        decision_reply("approve"),
        // WC-2: escalate
        coverage_reply("unclear"),
        fraud_reply(80.0),
        decision_reply("escalate"),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(model, retriever_with_policy(), notifier.clone());

    let batch = LoadedBatch {
        records: vec![claim("WC-1", 900), claim("WC-2", 4_500)],
        rejects: vec![RejectedRow {
            line: 3,
            claim_number: Some("WC-3".to_string()),
            reason: "Invalid amount in claimed_amount: \"oops\"".to_string(),
        }],
    };

    let mut report = pipeline.run_batch(batch).await;

    let summary = report.summary();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.approved, 1);
    assert_eq!(summary.manual_review, 1);
    assert_eq!(summary.correction_required, 1);

    // The rejected row is excluded from scoring but present in the table
    let rows = report.rows();
    let reject_row = rows
        .iter()
        .find(|r| r.claim_number.as_deref() == Some("WC-3"))
        .unwrap();
    assert_eq!(reject_row.status, "correction_required");
    assert!(reject_row.anomaly_score.is_none());

    // Reviewer override takes precedence in the export
    let row = report
        .apply_override(
            "WC-2",
            DecisionVerdict::Decline,
            "reviewer@example.com",
            Some("duplicate of a prior repair".to_string()),
        )
        .unwrap();
    assert_eq!(row.final_decision.as_deref(), Some("decline"));
    assert_eq!(row.status, "declined");
    assert_eq!(row.human_decision.as_deref(), Some("decline"));
    assert_eq!(row.decision.as_deref(), Some("escalate"));

    // CSV export carries the override
    let mut out = Vec::new();
    report.write_csv(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("decline"));
    assert!(text.contains("correction_required"));
}

#[tokio::test]
async fn override_on_unknown_claim_is_an_error() {
    let model = ScriptedModel::new(vec![]);
    let notifier = Arc::new(RecordingNotifier::default());
    let pipeline = pipeline(model, retriever_with_policy(), notifier.clone());

    let mut report = pipeline
        .run_batch(LoadedBatch::default())
        .await;

    let err = report
        .apply_override("WC-404", DecisionVerdict::Approve, "r@example.com", None)
        .unwrap_err();
    assert!(err.to_string().contains("WC-404"));
}
