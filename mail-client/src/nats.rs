use std::sync::Arc;

use async_trait::async_trait;
use events_bus::NatsBroker;
use logger_redacted::RedactedEmail;
use mail_common::{MessageComposer, MAIL_TOPIC};
use serde_json::Value;
use tracing::debug;

use crate::client::{compose_envelope, encode_envelope, MailClient};
use crate::error::MailClientResult;

/// Publishes mail envelopes on the `mail` NATS subject.
///
/// Fire-and-forget: `send_mail` returns once the publish is handed to the
/// NATS client, whether or not any dispatcher is subscribed.
pub struct NatsMailClient {
    broker: Arc<NatsBroker>,
    composer: Arc<dyn MessageComposer>,
    topic: String,
}

impl NatsMailClient {
    pub fn new(broker: Arc<NatsBroker>, composer: Arc<dyn MessageComposer>) -> Self {
        Self {
            broker,
            composer,
            topic: MAIL_TOPIC.to_string(),
        }
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    fn encode(
        &self,
        recipient: &str,
        subject_data: &Value,
        body_data: &Value,
    ) -> MailClientResult<Vec<u8>> {
        let envelope = compose_envelope(self.composer.as_ref(), recipient, subject_data, body_data)?;
        encode_envelope(&envelope)
    }
}

#[async_trait]
impl MailClient for NatsMailClient {
    async fn is_connected(&self) -> MailClientResult<bool> {
        Ok(self.broker.is_connected())
    }

    async fn send_mail(
        &self,
        recipient: &str,
        subject_data: &Value,
        body_data: &Value,
    ) -> MailClientResult<()> {
        let payload = self.encode(recipient, subject_data, body_data)?;
        self.broker.publish_bytes(&self.topic, payload).await?;

        debug!(recipient = %RedactedEmail(recipient), topic = %self.topic, "Mail published");
        Ok(())
    }
}
