use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use logger_redacted::RedactedEmail;
use mail_common::{MessageComposer, JSON_MIME_TYPE, MAIL_SERVICE_NAME};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use service_directory::DirectoryResolver;
use tracing::debug;

use crate::client::{compose_envelope, encode_envelope, MailClient};
use crate::error::{MailClientError, MailClientResult};

/// Reaches the mail service by resolving its address through the service
/// directory on every send and POSTing the envelope as JSON.
pub struct HttpMailClient {
    resolver: Option<DirectoryResolver>,
    composer: Arc<dyn MessageComposer>,
    http: reqwest::Client,
    service_name: String,
}

impl HttpMailClient {
    pub fn new(
        resolver: Option<DirectoryResolver>,
        composer: Arc<dyn MessageComposer>,
    ) -> MailClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MailClientError::Transport(e.to_string()))?;

        Ok(Self {
            resolver,
            composer,
            http,
            service_name: MAIL_SERVICE_NAME.to_string(),
        })
    }

    /// Resolve a service name other than `mail`.
    #[must_use]
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    fn resolver(&self) -> MailClientResult<&DirectoryResolver> {
        self.resolver
            .as_ref()
            .ok_or(MailClientError::NotInitialized("no service directory configured"))
    }
}

#[async_trait]
impl MailClient for HttpMailClient {
    /// True when at least one instance of the mail service is registered.
    async fn is_connected(&self) -> MailClientResult<bool> {
        Ok(self.resolver()?.has_instances(&self.service_name).await?)
    }

    async fn send_mail(
        &self,
        recipient: &str,
        subject_data: &Value,
        body_data: &Value,
    ) -> MailClientResult<()> {
        let resolver = self.resolver()?;
        let envelope = compose_envelope(self.composer.as_ref(), recipient, subject_data, body_data)?;

        let address = resolver.resolve_address(&self.service_name).await?;
        let body = encode_envelope(&envelope)?;

        let response = self
            .http
            .post(address.url())
            .header(CONTENT_TYPE, JSON_MIME_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| MailClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailClientError::Status(status.as_u16()));
        }

        debug!(
            recipient = %RedactedEmail(recipient),
            address = %address,
            "Mail handed to mail service"
        );
        Ok(())
    }
}
