//! Transactional email.
//!
//! - [`OutgoingEmail`] and the password reset template
//! - [`Mailer`] implementations: SMTP relay, log-only, in-memory

mod sender;
mod types;

pub use sender::{LogMailer, Mailer, MemoryMailer, SmtpMailer};
pub use types::{password_reset_email, reset_link, OutgoingEmail, MAX_SUBJECT_LENGTH};

use std::sync::Arc;

use crate::config::MailConfig;
use crate::Result;

/// Pick the mailer for the configuration.
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    if config.enabled {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}
