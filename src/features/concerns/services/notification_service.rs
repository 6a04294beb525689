//! Notification Service - tells resolvers about new concerns
//!
//! Delivery is best effort: a broken template or an unreachable mail relay is
//! logged and otherwise ignored, so reporters never see a notification failure.

use std::sync::Arc;

use minijinja::{context, Environment};
use thiserror::Error;

use crate::core::config::{ConcernsConfig, ResolverContact};
use crate::core::extractor::RequestMeta;
use crate::features::concerns::dtos::ConcernResponseDto;
use crate::features::concerns::models::Concern;
use crate::modules::mail::{MailError, MailTransport, Mailbox, OutgoingMail};
use crate::shared::constants::CONCERNS_BASE_PATH;

const EMAIL_TEMPLATE: &str = "concern_email.txt";

#[derive(Debug, Error)]
enum NotifyError {
    #[error("Failed to render notification: {0}")]
    Render(#[from] minijinja::Error),

    #[error(transparent)]
    Mail(#[from] MailError),
}

/// What happened to a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    NoRecipients,
    Failed,
}

/// Service for mailing resolvers when a concern comes in
pub struct NotificationService {
    transport: Arc<dyn MailTransport>,
    templates: Environment<'static>,
    site_name: String,
    subject: String,
    from_email: String,
    resolvers: Vec<ResolverContact>,
}

impl NotificationService {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        config: &ConcernsConfig,
        from_email: String,
    ) -> std::result::Result<Self, minijinja::Error> {
        let mut templates = Environment::new();
        templates.add_template(
            EMAIL_TEMPLATE,
            include_str!("../../../../templates/email/concern_email.txt.jinja"),
        )?;

        Ok(Self {
            transport,
            templates,
            site_name: config.site_name.clone(),
            subject: config.subject(),
            from_email,
            resolvers: config.resolvers.clone(),
        })
    }

    /// Mail `recipients`, or the configured resolvers when none are given.
    /// Never fails; the outcome is only informational.
    pub async fn notify(
        &self,
        meta: &RequestMeta,
        concern: &Concern,
        recipients: Option<&[String]>,
    ) -> NotifyOutcome {
        let to = self.recipients(recipients);
        if to.is_empty() {
            tracing::debug!(
                "No resolvers configured, skipping notification for concern {}",
                concern.id
            );
            return NotifyOutcome::NoRecipients;
        }

        match self.send(meta, concern, to).await {
            Ok(()) => {
                tracing::info!("Notification sent for concern {}", concern.id);
                NotifyOutcome::Sent
            }
            Err(e) => {
                tracing::warn!("Notification for concern {} failed: {}", concern.id, e);
                NotifyOutcome::Failed
            }
        }
    }

    fn recipients(&self, explicit: Option<&[String]>) -> Vec<Mailbox> {
        match explicit {
            Some(list) if !list.is_empty() => {
                list.iter().map(|email| Mailbox::address(email)).collect()
            }
            _ => self
                .resolvers
                .iter()
                .map(|r| Mailbox::new(&r.name, &r.address))
                .collect(),
        }
    }

    async fn send(
        &self,
        meta: &RequestMeta,
        concern: &Concern,
        to: Vec<Mailbox>,
    ) -> std::result::Result<(), NotifyError> {
        let mail = OutgoingMail {
            from: self.from_email.clone(),
            to,
            subject: self.subject.clone(),
            body: self.render_body(meta.scheme(), concern)?,
        };

        self.transport.send(&mail).await?;
        Ok(())
    }

    fn render_body(
        &self,
        protocol: &str,
        concern: &Concern,
    ) -> std::result::Result<String, minijinja::Error> {
        let detail_url = format!(
            "{}://{}{}/{}",
            protocol, self.site_name, CONCERNS_BASE_PATH, concern.id
        );

        self.templates.get_template(EMAIL_TEMPLATE)?.render(context! {
            protocol => protocol,
            site => &self.site_name,
            concern => ConcernResponseDto::from(concern.clone()),
            detail_url => detail_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        anonymous_meta, sample_concern, test_concerns_config, FailingMailTransport,
        RecordingMailTransport,
    };

    fn service(transport: Arc<dyn MailTransport>, config: &ConcernsConfig) -> NotificationService {
        NotificationService::new(transport, config, "webmaster@localhost".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_notify_uses_configured_resolvers() {
        let transport = Arc::new(RecordingMailTransport::default());
        let service = service(transport.clone(), &test_concerns_config());

        let outcome = service
            .notify(&anonymous_meta(), &sample_concern(1), None)
            .await;

        assert_eq!(outcome, NotifyOutcome::Sent);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Concern Reported for example.com");
        assert_eq!(sent[0].to, vec![Mailbox::new("John Doe", "jdoe@example.com")]);
        assert_eq!(sent[0].to[0].to_string(), "John Doe <jdoe@example.com>");
        assert_eq!(sent[0].from, "webmaster@localhost");
    }

    #[tokio::test]
    async fn test_notify_prefers_explicit_recipients() {
        let transport = Arc::new(RecordingMailTransport::default());
        let service = service(transport.clone(), &test_concerns_config());
        let explicit = vec!["oncall@example.com".to_string()];

        service
            .notify(&anonymous_meta(), &sample_concern(1), Some(explicit.as_slice()))
            .await;

        assert_eq!(
            transport.sent()[0].to,
            vec![Mailbox::address("oncall@example.com")]
        );
    }

    #[tokio::test]
    async fn test_notify_without_recipients_is_silent() {
        let transport = Arc::new(RecordingMailTransport::default());
        let mut config = test_concerns_config();
        config.resolvers.clear();
        let service = service(transport.clone(), &config);
        let nobody: Vec<String> = Vec::new();

        let outcome = service
            .notify(&anonymous_meta(), &sample_concern(1), Some(nobody.as_slice()))
            .await;

        assert_eq!(outcome, NotifyOutcome::NoRecipients);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_notify_swallows_transport_failure() {
        let service = service(Arc::new(FailingMailTransport), &test_concerns_config());

        let outcome = service
            .notify(&anonymous_meta(), &sample_concern(1), None)
            .await;

        assert_eq!(outcome, NotifyOutcome::Failed);
    }

    #[tokio::test]
    async fn test_body_links_with_request_scheme() {
        let transport = Arc::new(RecordingMailTransport::default());
        let service = service(transport.clone(), &test_concerns_config());
        let mut meta = anonymous_meta();
        meta.is_secure = true;
        let mut concern = sample_concern(42);
        concern.comment = Some("My address is visible".to_string());

        service.notify(&meta, &concern, None).await;

        let body = &transport.sent()[0].body;
        assert!(body.contains("Concern #42"));
        assert!(body.contains("My address is visible"));
        assert!(body.contains("Reporter: anonymous"));
        assert!(body.contains("https://example.com/api/concerns/42"));
    }

    #[test]
    fn test_subject_interpolates_site() {
        let mut config = test_concerns_config();
        config.site_name = "intranet.example.org".to_string();
        config.email_subject = "[{site}] privacy concern".to_string();
        let service = service(Arc::new(RecordingMailTransport::default()), &config);
        assert_eq!(service.subject, "[intranet.example.org] privacy concern");
    }
}
