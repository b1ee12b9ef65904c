use std::time::Duration;

use async_trait::async_trait;
use mail_common::MailMessage;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::{EmailError, EmailResult};
use crate::provider::MailProvider;

pub const MAILGUN_API_BASE: &str = "https://api.mailgun.net";

/// Mailgun account settings
#[derive(Debug)]
pub struct MailgunSettings {
    pub domain: String,
    pub api_key: SecretString,
    /// API root, `https://api.eu.mailgun.net` for EU domains
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// Delivers through the Mailgun messages API.
pub struct MailgunProvider {
    http: reqwest::Client,
    settings: MailgunSettings,
}

impl MailgunProvider {
    pub fn new(settings: MailgunSettings) -> EmailResult<Self> {
        if settings.domain.is_empty() {
            return Err(EmailError::Configuration(
                "MAILGUN_DOMAIN must be set".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EmailError::Configuration(e.to_string()))?;

        Ok(Self { http, settings })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/v3/{}/messages",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.domain
        )
    }
}

#[async_trait]
impl MailProvider for MailgunProvider {
    async fn send(&self, message: &MailMessage) -> EmailResult<String> {
        let form = [
            ("from", message.sender()),
            ("to", message.recipient()),
            ("subject", message.subject()),
            ("text", message.body()),
        ];

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth("api", Some(self.settings.api_key.expose_secret()))
            .form(&form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| EmailError::SendFailed(format!("Mailgun request failed: {}", e)))?;

        let body: SendResponse = response
            .json()
            .await
            .map_err(|e| EmailError::SendFailed(format!("Unexpected Mailgun response: {}", e)))?;

        debug!(provider = "mailgun", message_id = %body.id, "Email sent successfully");
        Ok(body.id)
    }

    fn name(&self) -> &'static str {
        "mailgun"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn provider_for(server: &mockito::ServerGuard) -> MailgunProvider {
        MailgunProvider::new(MailgunSettings {
            domain: "mg.suricata.com".to_string(),
            api_key: SecretString::new("key-test".to_string()),
            base_url: server.url(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_form_and_returns_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v3/mg.suricata.com/messages")
            .match_header("authorization", Matcher::Regex("^Basic ".to_string()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".to_string(), "info@suricata.com".to_string()),
                Matcher::UrlEncoded("to".to_string(), "a@b.com".to_string()),
                Matcher::UrlEncoded("subject".to_string(), "Hi".to_string()),
                Matcher::UrlEncoded("text".to_string(), "Hello".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"<20240101.1@mg.suricata.com>","message":"Queued. Thank you."}"#)
            .create_async()
            .await;

        let message = MailMessage::new("info@suricata.com", "Hi", "Hello", "a@b.com").unwrap();
        let id = provider_for(&server).send(&message).await.unwrap();

        assert_eq!(id, "<20240101.1@mg.suricata.com>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_send_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v3/mg.suricata.com/messages")
            .with_status(401)
            .create_async()
            .await;

        let message = MailMessage::new("info@suricata.com", "Hi", "Hello", "a@b.com").unwrap();
        let result = provider_for(&server).send(&message).await;

        assert!(matches!(result, Err(EmailError::SendFailed(_))));
    }

    #[test]
    fn test_empty_domain_is_rejected() {
        let result = MailgunProvider::new(MailgunSettings {
            domain: String::new(),
            api_key: SecretString::new("key".to_string()),
            base_url: MAILGUN_API_BASE.to_string(),
        });
        assert!(matches!(result, Err(EmailError::Configuration(_))));
    }
}
