// Provider selection from environment variables
use std::sync::Arc;

use mail_common::DEFAULT_SENDER;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EmailError, EmailResult};
use crate::mailgun::{MailgunProvider, MailgunSettings, MAILGUN_API_BASE};
use crate::provider::{LogProvider, MailProvider};
use crate::smtp::{SmtpProvider, SmtpSettings};

/// Email provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProviderType {
    Smtp,
    Mailgun,
    Log,
}

impl std::str::FromStr for EmailProviderType {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "smtp" => Ok(Self::Smtp),
            "mailgun" => Ok(Self::Mailgun),
            "log" => Ok(Self::Log),
            other => Err(EmailError::Configuration(format!(
                "unknown EMAIL_PROVIDER '{}'",
                other
            ))),
        }
    }
}

/// Email provider configuration
#[derive(Debug)]
pub enum EmailProvider {
    Smtp(SmtpSettings),
    Mailgun(MailgunSettings),
    /// Discard and log; no network traffic
    Log,
}

impl EmailProvider {
    pub fn provider_type(&self) -> EmailProviderType {
        match self {
            EmailProvider::Smtp(_) => EmailProviderType::Smtp,
            EmailProvider::Mailgun(_) => EmailProviderType::Mailgun,
            EmailProvider::Log => EmailProviderType::Log,
        }
    }

    /// Instantiate the provider. Disabled delivery always yields the logging
    /// provider.
    pub fn build(self, email_enabled: bool) -> EmailResult<Arc<dyn MailProvider>> {
        if !email_enabled {
            info!("Email delivery disabled by configuration");
            return Ok(Arc::new(LogProvider));
        }

        Ok(match self {
            EmailProvider::Smtp(settings) => Arc::new(SmtpProvider::new(settings)),
            EmailProvider::Mailgun(settings) => Arc::new(MailgunProvider::new(settings)?),
            EmailProvider::Log => Arc::new(LogProvider),
        })
    }
}

/// Email service configuration
#[derive(Debug)]
pub struct EmailConfig {
    pub provider: EmailProvider,
    pub from_email: String,
    pub email_enabled: bool,
    /// Hand-off queue depth between ingress and the dispatch worker
    pub queue_capacity: usize,
}

impl EmailConfig {
    /// Load email configuration from environment variables
    pub fn from_env() -> EmailResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> EmailResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let email_enabled = lookup("EMAIL_ENABLED")
            .and_then(|s| s.parse().ok())
            .unwrap_or(true);

        let from_email = lookup("EMAIL_FROM").unwrap_or_else(|| DEFAULT_SENDER.to_string());

        let queue_capacity = lookup("EMAIL_QUEUE_CAPACITY")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let provider_type = match lookup("EMAIL_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => EmailProviderType::Smtp,
        };

        let provider = match provider_type {
            EmailProviderType::Mailgun => EmailProvider::Mailgun(MailgunSettings {
                domain: lookup("MAILGUN_DOMAIN").unwrap_or_default(),
                api_key: SecretString::new(lookup("MAILGUN_API_KEY").unwrap_or_default()),
                base_url: lookup("MAILGUN_API_BASE").unwrap_or_else(|| MAILGUN_API_BASE.to_string()),
            }),
            EmailProviderType::Smtp => EmailProvider::Smtp(SmtpSettings {
                host: lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
                port: lookup("SMTP_PORT")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                username: lookup("SMTP_USERNAME"),
                password: lookup("SMTP_PASSWORD").map(SecretString::new),
                use_tls: lookup("SMTP_TLS_ENABLED")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            }),
            EmailProviderType::Log => EmailProvider::Log,
        };

        Ok(Self {
            provider,
            from_email,
            email_enabled,
            queue_capacity,
        })
    }
}
