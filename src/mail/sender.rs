//! Mail delivery.

use axum::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::types::OutgoingEmail;
use crate::config::MailConfig;
use crate::{AskarError, Result};

/// Something that can deliver an [`OutgoingEmail`].
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message. No retries.
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

/// SMTP delivery through a STARTTLS relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the transport from configuration.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let address = config
            .username
            .parse()
            .map_err(|e| AskarError::Config(format!("invalid sender address: {e}")))?;
        let from = Mailbox::new(Some(config.from_name.clone()), address);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AskarError::Config(format!("invalid SMTP relay: {e}")))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AskarError::Mail(format!("invalid recipient: {e}")))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| AskarError::Mail(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let message = self.build_message(email)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| AskarError::Mail(e.to_string()))?;
        info!(to = %email.to, code = %response.code(), "Email sent");
        Ok(())
    }
}

/// Logs messages instead of sending them. Used when SMTP is disabled.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        // The body carries reset links; keep it out of info-level logs.
        info!(to = %email.to, subject = %email.subject, "Mail delivery disabled");
        debug!(to = %email.to, "Undelivered message body:\n{}", email.text);
        Ok(())
    }
}

/// Keeps sent messages in memory.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail: bool,
}

impl MemoryMailer {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages sent so far.
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        if self.fail {
            return Err(AskarError::Mail("delivery failed".to_string()));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
