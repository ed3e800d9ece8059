//! Language Model Adapter
//!
//! Implements [`domain_adjudication::LanguageModelPort`] against an
//! OpenAI-compatible `chat/completions` endpoint. The adapter owns the
//! policies the pipeline relies on for fail-closed behavior:
//!
//! - a per-call timeout
//! - HTTP status mapping onto `PortError`
//! - bounded retry with exponential backoff for transient failures
//! - credential checks before any request leaves the process
//!
//! Configuration is the single generic OpenAI-style scheme: base URL,
//! API key, and model name.

pub mod adapter;

pub use adapter::{LlmConfig, OpenAiChatAdapter};
