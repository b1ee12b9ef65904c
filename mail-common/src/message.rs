use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{MailError, MailResult};

/// A fully resolved outbound mail, the unit of work handed to a provider.
///
/// Fields are private so a message cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    sender: String,
    subject: String,
    body: String,
    recipient: String,
}

impl MailMessage {
    /// Build a message, rejecting an empty recipient.
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        recipient: impl Into<String>,
    ) -> MailResult<Self> {
        let recipient = recipient.into();
        if recipient.trim().is_empty() {
            return Err(MailError::InvalidMessage(
                "recipient must not be empty".to_string(),
            ));
        }

        Ok(Self {
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
            recipient,
        })
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }
}

/// Wire representation of a mail, shared by HTTP and NATS.
///
/// Serializes with PascalCase keys (`Sender`, `Subject`, `Message`,
/// `Recipient`) and accepts lowercase keys on input. The body travels as
/// `Message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "PascalCase")]
pub struct MailEnvelope {
    #[serde(default, alias = "sender", skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    #[serde(default, alias = "subject")]
    pub subject: String,

    #[serde(default, alias = "message")]
    pub message: String,

    #[serde(default, alias = "recipient")]
    #[validate(length(min = 1, message = "recipient must not be empty"))]
    pub recipient: String,
}

impl MailEnvelope {
    /// Envelope without an explicit sender; the dispatcher fills in its default.
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sender: None,
            subject: subject.into(),
            message: message.into(),
            recipient: recipient.into(),
        }
    }

    #[must_use]
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Validate the envelope and turn it into a [`MailMessage`].
    ///
    /// A missing or blank sender is replaced by `default_sender`.
    pub fn into_message(self, default_sender: &str) -> MailResult<MailMessage> {
        self.validate()
            .map_err(|e| MailError::InvalidMessage(e.to_string()))?;

        let sender = self
            .sender
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default_sender.to_string());

        MailMessage::new(sender, self.subject, self.message, self.recipient)
    }
}

impl From<&MailMessage> for MailEnvelope {
    fn from(message: &MailMessage) -> Self {
        Self {
            sender: Some(message.sender.clone()),
            subject: message.subject.clone(),
            message: message.body.clone(),
            recipient: message.recipient.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_requires_recipient() {
        let result = MailMessage::new("info@suricata.com", "Hi", "Hello", "  ");
        assert!(matches!(result, Err(MailError::InvalidMessage(_))));
    }

    #[test]
    fn test_field_mapping_is_not_transposed() {
        let message = MailMessage::new("from@x.com", "the subject", "the body", "to@x.com").unwrap();

        assert_eq!(message.sender(), "from@x.com");
        assert_eq!(message.subject(), "the subject");
        assert_eq!(message.body(), "the body");
        assert_eq!(message.recipient(), "to@x.com");

        let envelope = MailEnvelope::from(&message);
        assert_eq!(envelope.subject, "the subject");
        assert_eq!(envelope.message, "the body");
    }

    #[test]
    fn test_envelope_serializes_pascal_case() {
        let envelope = MailEnvelope::new("a@b.com", "Hi", "Hello");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "Recipient": "a@b.com", "Subject": "Hi", "Message": "Hello" })
        );
    }

    #[test]
    fn test_envelope_accepts_lowercase_keys() {
        let raw = r#"{"sender":"s@x.com","message":"Hello","subject":"Hi","recipient":"a@b.com"}"#;
        let envelope: MailEnvelope = serde_json::from_str(raw).unwrap();

        assert_eq!(envelope.sender.as_deref(), Some("s@x.com"));
        assert_eq!(envelope.subject, "Hi");
        assert_eq!(envelope.message, "Hello");
        assert_eq!(envelope.recipient, "a@b.com");
    }

    #[test]
    fn test_wire_round_trip_preserves_every_field() {
        let original = MailMessage::new("from@x.com", "Subject", "Body", "to@x.com").unwrap();

        let bytes = serde_json::to_vec(&MailEnvelope::from(&original)).unwrap();
        let decoded: MailEnvelope = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded.into_message("ignored@x.com").unwrap(), original);
    }

    #[test]
    fn test_missing_sender_uses_default() {
        let message = MailEnvelope::new("a@b.com", "Hi", "Hello")
            .with_sender("")
            .into_message("info@suricata.com")
            .unwrap();

        assert_eq!(message.sender(), "info@suricata.com");
    }

    #[test]
    fn test_missing_recipient_fails_validation() {
        let envelope: MailEnvelope = serde_json::from_str(r#"{"subject":"Hi"}"#).unwrap();
        assert!(envelope.into_message("info@suricata.com").is_err());
    }
}
