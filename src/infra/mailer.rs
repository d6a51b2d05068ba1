//! Outbound e-mail.
//!
//! When SMTP is not configured, messages are logged instead of sent so the
//! notification paths can run in development.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::MailSettings;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// A message ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub html: bool,
}

impl Email {
    pub fn text(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
            html: false,
        }
    }

    pub fn html(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            html: true,
            ..Self::text(to, subject, body)
        }
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> AppResult<()>;
}

/// Pick the SMTP mailer when a host is configured, the logging one otherwise.
pub fn from_settings(settings: &MailSettings) -> AppResult<Arc<dyn Mailer>> {
    match SmtpMailer::from_settings(settings)? {
        Some(mailer) => {
            tracing::info!(host = ?settings.smtp_host, "SMTP mailer configured");
            Ok(Arc::new(mailer))
        }
        None => {
            tracing::warn!("SMTP not configured - emails will be logged instead of sent");
            Ok(Arc::new(LogMailer::new(settings.from.clone())))
        }
    }
}

/// Sends mail through an SMTP relay with STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Returns None when no SMTP host is configured.
    pub fn from_settings(settings: &MailSettings) -> AppResult<Option<Self>> {
        let Some(host) = settings.smtp_host.as_deref() else {
            return Ok(None);
        };

        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|e| AppError::internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::internal(format!("Invalid SMTP relay: {}", e)))?
            .port(settings.smtp_port);

        if let (Some(user), Some(pass)) = (settings.smtp_user.as_deref(), settings.smtp_pass()) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        Ok(Some(Self {
            transport: builder.build(),
            from,
        }))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: Email) -> AppResult<()> {
        let to = email
            .to
            .parse::<Mailbox>()
            .map_err(|e| AppError::internal(format!("Invalid recipient '{}': {}", email.to, e)))?;

        let content_type = if email.html {
            ContentType::TEXT_HTML
        } else {
            ContentType::TEXT_PLAIN
        };

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .header(content_type)
            .body(email.body)
            .map_err(|e| AppError::internal(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::internal(format!("SMTP delivery failed: {}", e)))?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Development mailer: logs the message instead of sending it.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> AppResult<()> {
        tracing::info!(
            "=== EMAIL (not sent) ===\n\
             From: {}\n\
             To: {}\n\
             Subject: {}\n\
             Body:\n{}\n\
             ========================",
            self.from,
            email.to,
            email.subject,
            email.body
        );
        Ok(())
    }
}
