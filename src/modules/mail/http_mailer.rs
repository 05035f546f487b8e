use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::mailer::{EmailMessage, Mailer};
use crate::core::config::MailConfig;
use crate::core::error::AppError;

/// JSON body accepted by the mail delivery API
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    text: &'a str,
}

/// Delivers mail by POSTing JSON to an HTTP API
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from_email: String,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, AppError> {
        let api_url = config
            .api_url
            .clone()
            .ok_or_else(|| AppError::Internal("MAIL_API_URL is not configured".to_string()))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build mail HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url,
            api_key: config.api_key.clone(),
            from_email: config.from_email.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        let payload = SendEmailRequest {
            from: &self.from_email,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Mail API request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalServiceError(format!(
                "Mail API returned {}: {}",
                status, body
            )));
        }

        tracing::debug!("Mail API accepted message to {}", message.to.join(", "));
        Ok(())
    }
}
