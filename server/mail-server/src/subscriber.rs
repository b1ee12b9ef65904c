// NATS ingress
use std::sync::Arc;

use email_service::DispatchEngine;
use events_bus::{NatsBroker, Result};
use logger_redacted::{Redacted, RedactedEmail};
use mail_common::MailEnvelope;
use tracing::{debug, warn};

/// Join `queue_group` on `topic` and forward every envelope to the engine.
///
/// Instances sharing a queue group split the stream, so each message reaches
/// exactly one of them. Returns the subscription id.
pub async fn start_mail_subscriber(
    broker: &NatsBroker,
    engine: Arc<DispatchEngine>,
    topic: &str,
    queue_group: &str,
) -> Result<String> {
    broker
        .queue_subscribe_json(topic, queue_group, move |envelope: MailEnvelope| {
            let engine = engine.clone();
            async move { forward_envelope(&engine, envelope).await }
        })
        .await
}

/// Submit one decoded envelope; failures are logged since there is no caller
/// to report to.
pub async fn forward_envelope(engine: &DispatchEngine, envelope: MailEnvelope) {
    let recipient = RedactedEmail(&envelope.recipient).to_string();

    match engine.submit_envelope(envelope).await {
        Ok(()) => debug!(recipient = %recipient, "Mail received over NATS"),
        Err(e) => warn!(recipient = %recipient, error = %Redacted(&e), "Dropping mail from NATS"),
    }
}
