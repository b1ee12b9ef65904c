use async_trait::async_trait;
use mail_common::{MailEnvelope, MessageComposer};
use serde_json::Value;

use crate::error::{MailClientError, MailClientResult};

/// Capability set shared by every mail transport.
#[async_trait]
pub trait MailClient: Send + Sync {
    /// Whether the mail service is currently reachable through this transport.
    async fn is_connected(&self) -> MailClientResult<bool>;

    /// Compose subject and body from the given data and hand the mail to the
    /// mail service. Performs exactly one outbound network operation and never
    /// retries.
    async fn send_mail(
        &self,
        recipient: &str,
        subject_data: &Value,
        body_data: &Value,
    ) -> MailClientResult<()>;
}

/// Render an outbound envelope. Template failures degrade to empty text.
pub(crate) fn compose_envelope(
    composer: &dyn MessageComposer,
    recipient: &str,
    subject_data: &Value,
    body_data: &Value,
) -> MailClientResult<MailEnvelope> {
    if recipient.trim().is_empty() {
        return Err(MailClientError::InvalidMessage(
            "recipient must not be empty".to_string(),
        ));
    }

    Ok(MailEnvelope::new(
        recipient,
        composer.compose_subject_or_default(subject_data),
        composer.compose_message_or_default(body_data),
    ))
}

/// Wire bytes of an envelope, shared by every transport.
pub(crate) fn encode_envelope(envelope: &MailEnvelope) -> MailClientResult<Vec<u8>> {
    Ok(serde_json::to_vec(envelope)?)
}
