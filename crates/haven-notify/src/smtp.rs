//! SMTP transport via lettre.

use crate::{Mailer, NotifyError, OutboundEmail};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};

/// SMTP relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub smtp_host: String,
    /// Typically 587 for STARTTLS.
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
}

/// Production mailer over an async SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the relay transport from config.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| NotifyError::Config(format!("SMTP relay error: {e}")))?
            .credentials(creds)
            .port(config.smtp_port)
            .build();
        Ok(Self { transport })
    }
}

impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        let message = build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::SendFailed(format!("SMTP send failed: {e}")))?;

        log::info!("Email sent to {} ({:?})", email.to, email.subject);
        Ok(())
    }
}

/// Build a `lettre::Message` from an outbound email.
fn build_message(email: &OutboundEmail) -> Result<Message, NotifyError> {
    Message::builder()
        .from(
            email
                .from
                .parse()
                .map_err(|e| NotifyError::SendFailed(format!("Invalid from address: {e}")))?,
        )
        .to(email
            .to
            .parse()
            .map_err(|e| NotifyError::SendFailed(format!("Invalid to address: {e}")))?)
        .subject(&email.subject)
        .header(ContentType::TEXT_HTML)
        .body(email.html.clone())
        .map_err(|e| NotifyError::SendFailed(format!("Failed to build email: {e}")))
}
