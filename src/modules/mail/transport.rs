use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::core::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// A recipient address with an optional display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub name: Option<String>,
    pub email: String,
}

impl Mailbox {
    pub fn new(name: &str, email: &str) -> Self {
        let name = name.trim();
        Self {
            name: (!name.is_empty()).then(|| name.to_string()),
            email: email.to_string(),
        }
    }

    pub fn address(email: &str) -> Self {
        Self::new("", email)
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => f.write_str(&self.email),
        }
    }
}

/// A plain-text message ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<Mailbox>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Build the transport described by the configuration
pub fn transport_from_config(config: &MailConfig) -> Result<Arc<dyn MailTransport>, MailError> {
    match (&config.api_url, &config.api_key) {
        (Some(url), Some(key)) => Ok(Arc::new(HttpMailTransport::new(url.clone(), key.clone())?)),
        _ => Ok(Arc::new(LogMailTransport)),
    }
}

// =============================================================================
// HTTP TRANSACTIONAL MAIL API
// =============================================================================

#[derive(Serialize)]
struct ApiAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiPayload<'a> {
    sender: ApiAddress<'a>,
    to: Vec<ApiAddress<'a>>,
    subject: &'a str,
    text_content: &'a str,
}

impl<'a> From<&'a OutgoingMail> for ApiPayload<'a> {
    fn from(mail: &'a OutgoingMail) -> Self {
        Self {
            sender: ApiAddress {
                email: &mail.from,
                name: None,
            },
            to: mail
                .to
                .iter()
                .map(|mailbox| ApiAddress {
                    email: &mailbox.email,
                    name: mailbox.name.as_deref(),
                })
                .collect(),
            subject: &mail.subject,
            text_content: &mail.body,
        }
    }
}

/// Sends mail through a transactional email HTTP API (`POST` JSON with an
/// `api-key` header)
pub struct HttpMailTransport {
    api_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl HttpMailTransport {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(api_url: String, api_key: String) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MailError::RequestFailed(e.to_string()))?;

        Ok(Self {
            api_url,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl MailTransport for HttpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .json(&ApiPayload::from(mail))
            .send()
            .await
            .map_err(|e| MailError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(MailError::ApiError(format!("{} - {}", status, text)));
        }

        Ok(())
    }
}

// =============================================================================
// LOG ONLY
// =============================================================================

/// Writes messages to the log instead of delivering them. Used when no mail
/// API is configured.
pub struct LogMailTransport;

#[async_trait]
impl MailTransport for LogMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            from = %mail.from,
            to = %mail
                .to
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            subject = %mail.subject,
            "Mail not delivered (no mail API configured):\n{}",
            mail.body
        );
        Ok(())
    }
}
