//! Outgoing mail messages.

/// Maximum length for a subject line.
pub const MAX_SUBJECT_LENGTH: usize = 200;

/// A transactional email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
    /// Plain-text body.
    pub text: String,
}

impl OutgoingEmail {
    /// Create a new message.
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
            text: text.into(),
        }
    }
}

/// Link the reset email points at.
pub fn reset_link(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password/{}",
        frontend_url.trim_end_matches('/'),
        urlencoding::encode(token)
    )
}

/// Build the password reset email.
pub fn password_reset_email(to: &str, link: &str, valid_minutes: u64) -> OutgoingEmail {
    let text = format!(
        "We received a request to reset your 3askar Drive password.\n\n\
         Open this link to choose a new password:\n{link}\n\n\
         The link expires in {valid_minutes} minutes. \
         If you did not ask for a reset, you can ignore this email."
    );
    let html = format!(
        "<p>We received a request to reset your 3askar Drive password.</p>\
         <p><a href=\"{link}\">Reset your password</a></p>\
         <p>The link expires in {valid_minutes} minutes. \
         If you did not ask for a reset, you can ignore this email.</p>"
    );
    OutgoingEmail::new(to, "Reset your 3askar Drive password", html, text)
}
