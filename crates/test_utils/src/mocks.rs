//! Scripted ports for pipeline tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};
use domain_adjudication::{
    CompletionRequest, EscalationNotice, LanguageModelPort, ReviewerNotifier,
};

/// Language model whose replies are scripted per test
///
/// Replies are consumed in order; an exhausted script returns an internal
/// error, which the pipeline treats as a stage failure.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, PortError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<String, PortError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Scripts a sequence of successful text replies
    pub fn with_texts(texts: Vec<String>) -> Arc<Self> {
        Self::new(texts.into_iter().map(Ok).collect())
    }

    /// Prompts the pipeline sent, in call order
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().expect("request lock").clone()
    }

    /// Number of completions the pipeline requested
    pub fn calls(&self) -> usize {
        self.requests.lock().expect("request lock").len()
    }
}

impl DomainPort for ScriptedModel {}

#[async_trait]
impl core_kernel::HealthCheckable for ScriptedModel {
    async fn health_check(&self) -> core_kernel::HealthCheckResult {
        core_kernel::HealthCheckResult {
            adapter_id: "scripted-model".to_string(),
            status: core_kernel::AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }
}

#[async_trait]
impl LanguageModelPort for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, PortError> {
        self.requests.lock().expect("request lock").push(request);
        self.replies
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(PortError::internal("scripted replies exhausted")))
    }
}

/// Notifier that records notices instead of sending them
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<EscalationNotice>>,
    fail_with: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A notifier that fails every delivery with the given message
    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            notices: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        })
    }

    pub fn notices(&self) -> Vec<EscalationNotice> {
        self.notices.lock().expect("notice lock").clone()
    }

    pub fn count(&self) -> usize {
        self.notices.lock().expect("notice lock").len()
    }
}

impl DomainPort for RecordingNotifier {}

#[async_trait]
impl ReviewerNotifier for RecordingNotifier {
    async fn notify(&self, notice: &EscalationNotice) -> Result<(), PortError> {
        if let Some(message) = &self.fail_with {
            return Err(PortError::connection(message.clone()));
        }
        self.notices
            .lock()
            .expect("notice lock")
            .push(notice.clone());
        Ok(())
    }
}
