//! Outbound email.
//!
//! Delivery is an external collaborator; the service depends only on the
//! [`Mailer`] interface, injected at construction so tests can swap in a
//! double.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail dispatch failed: {0}")]
    Dispatch(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}

/// Logs outbound mail instead of delivering it.
///
/// Stands in for a real transport in development and tests.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::info!(to = %to, subject = %subject, body = %body, "Outbound mail (log transport)");
        Ok(())
    }
}
