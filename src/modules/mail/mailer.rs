use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::http_mailer::HttpMailer;
use crate::core::config::{MailBackend, MailConfig};
use crate::core::error::AppError;

/// A plain-text email ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Delivery seam for outbound email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

/// Writes messages to the log instead of delivering them
pub struct LogMailer {
    from_email: String,
}

impl LogMailer {
    pub fn new(from_email: impl Into<String>) -> Self {
        Self {
            from_email: from_email.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        tracing::info!(
            from = %self.from_email,
            to = %message.to.join(", "),
            subject = %message.subject,
            "Email (log backend):\n{}",
            message.body
        );
        Ok(())
    }
}

/// Mailer selected by `MAIL_BACKEND`
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>, AppError> {
    match config.backend {
        MailBackend::Log => Ok(Arc::new(LogMailer::new(config.from_email.clone()))),
        MailBackend::Http => Ok(Arc::new(HttpMailer::new(config)?)),
    }
}
