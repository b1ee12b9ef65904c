use async_trait::async_trait;
use mail_builder::MessageBuilder;
use mail_common::MailMessage;
use mail_send::SmtpClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EmailError, EmailResult};
use crate::provider::MailProvider;

/// SMTP relay settings
#[derive(Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub use_tls: bool,
}

/// Delivers through an SMTP relay, one connection per message.
pub struct SmtpProvider {
    settings: SmtpSettings,
}

impl SmtpProvider {
    pub fn new(settings: SmtpSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl MailProvider for SmtpProvider {
    async fn send(&self, message: &MailMessage) -> EmailResult<String> {
        let settings = &self.settings;

        let mut smtp_client =
            SmtpClientBuilder::new(settings.host.as_str(), settings.port).implicit_tls(settings.use_tls);

        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            smtp_client = smtp_client.credentials((user.as_str(), pass.expose_secret().as_str()));
        }

        let mut client = smtp_client
            .connect()
            .await
            .map_err(|e| EmailError::SendFailed(format!("SMTP connection failed: {}", e)))?;

        let mail = MessageBuilder::new()
            .from(message.sender())
            .to(message.recipient())
            .subject(message.subject())
            .text_body(message.body());

        let message_id = Uuid::new_v4().to_string();
        client
            .send(mail)
            .await
            .map_err(|e| EmailError::SendFailed(format!("Failed to send email: {}", e)))?;

        debug!(provider = "smtp", message_id = %message_id, "Email sent successfully");
        Ok(message_id)
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
