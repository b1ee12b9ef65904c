// Outbound provider seam
use async_trait::async_trait;
use logger_redacted::RedactedEmail;
use mail_common::MailMessage;
use tracing::info;
use uuid::Uuid;

use crate::error::EmailResult;

/// Something that can hand one message to a mail transport.
///
/// `send` is called exactly once per dequeued message and returns the
/// provider's tracking id.
#[async_trait]
pub trait MailProvider: Send + Sync {
    async fn send(&self, message: &MailMessage) -> EmailResult<String>;

    fn name(&self) -> &'static str;
}

/// Provider used when delivery is disabled; logs and reports a synthetic id.
#[derive(Debug, Default, Clone)]
pub struct LogProvider;

#[async_trait]
impl MailProvider for LogProvider {
    async fn send(&self, message: &MailMessage) -> EmailResult<String> {
        let tracking_id = format!("disabled-{}", Uuid::new_v4());
        info!(
            recipient = %RedactedEmail(message.recipient()),
            tracking_id = %tracking_id,
            "Email delivery disabled, message discarded"
        );
        Ok(tracking_id)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
