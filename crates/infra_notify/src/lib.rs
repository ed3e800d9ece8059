//! Reviewer Notification Adapters
//!
//! Implements [`domain_adjudication::ReviewerNotifier`] two ways: an SMTP
//! adapter that mails the escalation notice to the configured reviewer
//! address, and a log-only adapter used when notification is not
//! configured. Either way, failures surface as `PortError` and the
//! pipeline records them without aborting the batch.

pub mod smtp;
pub mod log;

pub use smtp::{SmtpConfig, SmtpNotifier};
pub use log::LogNotifier;
