//! Application configuration
//!
//! One flat environment surface with the `TRIAGE_` prefix. The LLM side is
//! the generic OpenAI-style scheme: base URL, API key, model name.

use serde::Deserialize;

use infra_llm::LlmConfig;
use infra_notify::SmtpConfig;

/// Application configuration loaded from the environment
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Optional static API key required on mutating endpoints
    pub api_key: Option<String>,
    /// Log level
    pub log_level: String,

    /// Path to the plain-text policy document; unset means no corpus
    pub policy_path: Option<String>,
    /// Passages retrieved per claim
    pub retrieval_top_k: usize,
    /// Standard deviations beyond which a field sets the anomaly flag
    pub anomaly_flag_sigma: f64,

    /// OpenAI-compatible endpoint base URL
    pub llm_base_url: String,
    /// Model API key
    pub llm_api_key: String,
    /// Model name
    pub llm_model: String,
    /// Per-call timeout in seconds
    pub llm_timeout_secs: u64,
    /// Retry attempts for transient model failures
    pub llm_max_retries: u32,

    /// SMTP relay host; unset disables email notification
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// Sender address for escalation mail
    pub email_from: Option<String>,
    /// Reviewer address escalations are sent to
    pub email_reviewer: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let llm_defaults = LlmConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            api_key: None,
            log_level: "info".to_string(),
            policy_path: None,
            retrieval_top_k: 4,
            anomaly_flag_sigma: 3.0,
            llm_base_url: llm_defaults.base_url,
            llm_api_key: String::new(),
            llm_model: llm_defaults.model,
            llm_timeout_secs: llm_defaults.timeout_secs,
            llm_max_retries: llm_defaults.max_retries,
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            email_from: None,
            email_reviewer: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from `TRIAGE_`-prefixed environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("TRIAGE").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The language model adapter configuration
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            base_url: self.llm_base_url.clone(),
            api_key: self.llm_api_key.clone(),
            model: self.llm_model.clone(),
            timeout_secs: self.llm_timeout_secs,
            max_retries: self.llm_max_retries,
            ..LlmConfig::default()
        }
    }

    /// SMTP configuration, when notification is fully configured
    pub fn smtp_config(&self) -> Option<SmtpConfig> {
        let host = self.smtp_host.clone()?;
        let from = self.email_from.clone()?;
        let to = self.email_reviewer.clone()?;
        Some(SmtpConfig {
            host,
            port: self.smtp_port,
            username: self.smtp_username.clone().unwrap_or_default(),
            password: self.smtp_password.clone().unwrap_or_default(),
            from,
            to,
        })
    }
}
