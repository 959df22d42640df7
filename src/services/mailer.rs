use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay responded with status {0}")]
    Status(u16),

    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), MailError>;
}

/// Pick the relay client when a relay URL is configured, else log messages only.
pub fn from_config(config: &MailConfig) -> Result<std::sync::Arc<dyn Mailer>, MailError> {
    Ok(match &config.relay_url {
        Some(url) => std::sync::Arc::new(HttpMailer::new(url, config)?),
        None => std::sync::Arc::new(LogMailer),
    })
}

/// Posts `{ from, to, subject, text }` as JSON to an HTTP mail relay
pub struct HttpMailer {
    client: reqwest::Client,
    relay_url: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailer {
    pub fn new(relay_url: &str, config: &MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            relay_url: relay_url.to_string(),
            api_key: config.api_key.clone(),
            from: format_sender(config),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        let payload = RelayPayload {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.text,
        };
        let mut request = self.client.post(&self.relay_url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(MailError::Status(response.status().as_u16()));
        }
        tracing::info!("Message sent to {}: {}", message.to, message.subject);
        Ok(())
    }
}

/// Writes outgoing mail to the log; used when no relay is configured
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: Message) -> Result<(), MailError> {
        tracing::info!(
            "Mail relay not configured; message to {} ({}):\n{}",
            message.to,
            message.subject,
            message.text
        );
        Ok(())
    }
}

fn format_sender(config: &MailConfig) -> String {
    if config.from_name.is_empty() {
        config.from_email.clone()
    } else {
        format!("{} <{}>", config.from_name, config.from_email)
    }
}

/// Body of the password-reset e-mail
pub fn reset_message(to: &str, reset_url: &str) -> Message {
    Message {
        to: to.to_string(),
        subject: "Password reset token".to_string(),
        text: format!(
            "You are receiving this email because you (or someone else) has requested the reset of a password. \
             Please make a PUT request to: \n\n {}",
            reset_url
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config() -> MailConfig {
        MailConfig {
            relay_url: None,
            api_key: None,
            from_email: "noreply@devcamper.io".into(),
            from_name: "DevCamper".into(),
        }
    }

    #[test]
    fn sender_includes_display_name() {
        assert_eq!(format_sender(&mail_config()), "DevCamper <noreply@devcamper.io>");
        let mut bare = mail_config();
        bare.from_name.clear();
        assert_eq!(format_sender(&bare), "noreply@devcamper.io");
    }

    #[test]
    fn reset_message_carries_the_url() {
        let message = reset_message("john@gmail.com", "http://localhost:5000/api/v1/auth/resetpassword/abc");
        assert_eq!(message.to, "john@gmail.com");
        assert!(message.text.ends_with("/api/v1/auth/resetpassword/abc"));
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = from_config(&mail_config()).unwrap();
        assert!(mailer.send(reset_message("a@b.io", "http://x")).await.is_ok());
    }
}
