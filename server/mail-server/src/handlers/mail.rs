use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use logger_redacted::RedactedEmail;
use mail_common::MailEnvelope;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::server::MailServer;

/// Acknowledgement of an accepted mail
#[derive(Debug, Serialize, Deserialize)]
pub struct QueuedResponse {
    pub status: String,
}

/// HTTP ingress: decode the envelope and queue it for dispatch.
///
/// The body is read raw so callers need not set a content type. A 202 means
/// the message was queued; delivery happens later and its outcome is not
/// reported back.
pub async fn submit_mail(
    State(server): State<MailServer>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<QueuedResponse>)> {
    let envelope: MailEnvelope = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("malformed mail envelope: {}", e)))?;

    debug!(recipient = %RedactedEmail(&envelope.recipient), "Mail received over HTTP");
    server.engine.submit_envelope(envelope).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(QueuedResponse {
            status: "queued".to_string(),
        }),
    ))
}
