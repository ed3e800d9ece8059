//! End-to-end triage flows built from the shared fixtures

use std::sync::Arc;

use once_cell::sync::Lazy;
use proptest::prelude::*;
use rust_decimal_macros::dec;

use core_kernel::PortError;
use domain_adjudication::batch::historical_profile;
use domain_adjudication::{ClaimPipeline, PipelineConfig, PipelineStage};
use domain_anomaly::AnomalyScorer;
use domain_claims::{DecisionVerdict, LoadedBatch, TriageStatus};
use test_utils::{
    assert_failed_closed, assert_status, assert_traced_stages, claim_batch, claim_record,
    replies, standard_retriever, ClaimRecordBuilder, RecordingNotifier, ScriptedModel,
};

static RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
});

fn pipeline(model: Arc<ScriptedModel>, notifier: Arc<RecordingNotifier>) -> ClaimPipeline {
    ClaimPipeline::new(
        model,
        Arc::new(standard_retriever()),
        notifier,
        AnomalyScorer::default(),
        PipelineConfig::default(),
    )
}

#[test]
fn full_batch_flow_with_override() {
    RUNTIME.block_on(async {
        let model = ScriptedModel::with_texts(vec![
            replies::coverage("covered"),
            replies::fraud(12.0),
            replies::decision("approve"),
            replies::fenced(&replies::coverage("unclear")),
            replies::fraud(78.0),
            replies::decision("escalate"),
        ]);
        let notifier = RecordingNotifier::new();
        let pipeline = pipeline(model.clone(), notifier.clone());

        let batch = LoadedBatch {
            records: claim_batch(&[640, 5200]),
            rejects: Vec::new(),
        };
        let mut report = pipeline.run_batch(batch).await;

        // Three model calls per claim: coverage, fraud, decision
        assert_eq!(model.calls(), 6);

        let dossiers = report.dossiers();
        assert_status(&dossiers[0], TriageStatus::Approved);
        assert_status(&dossiers[1], TriageStatus::ManualReview);
        assert_traced_stages(
            &dossiers[0],
            &[
                PipelineStage::AnomalyScoring,
                PipelineStage::PolicyRetrieval,
                PipelineStage::PolicyCheck,
                PipelineStage::FraudScoring,
                PipelineStage::EvidenceAssembly,
                PipelineStage::Decision,
            ],
        );

        // Escalation notified the reviewer with the claim's numbers
        assert_eq!(notifier.count(), 1);
        let notice = &notifier.notices()[0];
        assert_eq!(notice.claim_number, "WC-2001");
        assert_eq!(notice.fraud_score, Some(78.0));

        // The reviewer's call is what the table reports afterwards
        let row = report
            .apply_override(
                "WC-2001",
                DecisionVerdict::Approve,
                "reviewer@example.com",
                Some("documented authorization on file".to_string()),
            )
            .unwrap();
        assert_eq!(row.final_decision.as_deref(), Some("approve"));
        assert_eq!(row.status, "approved");
    });
}

#[test]
fn fenced_replies_still_parse() {
    RUNTIME.block_on(async {
        let model = ScriptedModel::with_texts(vec![
            replies::fenced(&replies::coverage("covered")),
            replies::fenced(&replies::fraud(5.0)),
            replies::fenced(&replies::decision("approve")),
        ]);
        let notifier = RecordingNotifier::new();
        let pipeline = pipeline(model, notifier);

        let record = ClaimRecordBuilder::new().with_amount(dec!(450)).build();
        let profile = historical_profile(std::slice::from_ref(&record));
        let dossier = pipeline.run_claim(record, &profile).await;

        assert_status(&dossier, TriageStatus::Approved);
    });
}

#[test]
fn prose_reply_fails_closed() {
    RUNTIME.block_on(async {
        let model = ScriptedModel::with_texts(vec![replies::prose()]);
        let notifier = RecordingNotifier::new();
        let pipeline = pipeline(model, notifier);

        let record = ClaimRecordBuilder::new().build();
        let profile = historical_profile(std::slice::from_ref(&record));
        let dossier = pipeline.run_claim(record, &profile).await;

        assert_failed_closed(&dossier);
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Fail-closed property: whatever the claim looks like, a model
    /// failure must end in manual review, never approval.
    #[test]
    fn model_failures_never_approve(record in claim_record()) {
        RUNTIME.block_on(async move {
            let model = ScriptedModel::new(vec![Err(PortError::connection("socket reset"))]);
            let notifier = RecordingNotifier::new();
            let pipeline = pipeline(model, notifier);

            let profile = historical_profile(std::slice::from_ref(&record));
            let dossier = pipeline.run_claim(record, &profile).await;

            assert_failed_closed(&dossier);
        });
    }

    /// Unparseable replies are equivalent to failures for approval purposes.
    #[test]
    fn garbage_replies_never_approve(record in claim_record()) {
        RUNTIME.block_on(async move {
            let model = ScriptedModel::with_texts(vec![
                replies::prose(),
                replies::prose(),
                replies::prose(),
            ]);
            let notifier = RecordingNotifier::new();
            let pipeline = pipeline(model, notifier);

            let profile = historical_profile(std::slice::from_ref(&record));
            let dossier = pipeline.run_claim(record, &profile).await;

            prop_assert_ne!(dossier.status(), TriageStatus::Approved);
            Ok(())
        })?;
    }
}
