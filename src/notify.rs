//! Account lifecycle emails.
//!
//! Emails are sent fire-and-forget: [`dispatch`] spawns the send and returns at once.
//! A failed send is logged and dropped; it is never retried and never reaches the
//! request that triggered it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

const SENDGRID_API_URL: &str = "https://api.sendgrid.com";

/// A plain-text message to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
}

pub fn welcome_email(to: &str, name: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Welcome!".to_string(),
        text: format!(
            "Welcome to the app, {}. Let me know how you get along with the app.",
            name
        ),
    }
}

pub fn goodbye_email(to: &str, name: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Goodbye!".to_string(),
        text: format!("We will miss you {}. How can we improve our services?", name),
    }
}

#[derive(Debug)]
pub enum MailError {
    /// The provider could not be reached.
    Transport(String),
    /// The provider answered with a non-success status.
    Rejected { status: u16, body: String },
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MailError::Transport(msg) => write!(f, "Mail transport error: {}", msg),
            MailError::Rejected { status, body } => {
                write!(f, "Mail provider rejected message ({}): {}", status, body)
            }
        }
    }
}

impl std::error::Error for MailError {}

impl From<reqwest::Error> for MailError {
    fn from(error: reqwest::Error) -> Self {
        MailError::Transport(error.to_string())
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

/// Sends through the SendGrid v3 `mail/send` endpoint.
pub struct SendGridMailer {
    client: reqwest::Client,
    api_key: String,
    from: String,
    base_url: String,
}

impl SendGridMailer {
    pub fn new(api_key: impl Into<String>, from: impl Into<String>) -> Self {
        Self::with_base_url(api_key, from, SENDGRID_API_URL)
    }

    /// Points the mailer at another host, e.g. a local mock of the API.
    pub fn with_base_url(
        api_key: impl Into<String>,
        from: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            from: from.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.from },
            "subject": email.subject,
            "content": [{ "type": "text/plain", "value": email.text }],
        });

        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Writes emails to the log instead of sending them. Used when no provider key is set.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        log::info!(
            "Email to {} (not sent, no provider configured): {} - {}",
            email.to,
            email.subject,
            email.text
        );
        Ok(())
    }
}

/// Sends `email` in the background.
pub fn dispatch(mailer: Arc<dyn Mailer>, email: Email) {
    tokio::spawn(async move {
        let to = email.to.clone();
        let subject = email.subject.clone();
        if let Err(e) = mailer.send(email).await {
            log::warn!("Failed to send \"{}\" email to {}: {}", subject, to, e);
        }
    });
}
