//! Common mail types shared by every Mailgate crate
//!
//! This module provides the pieces that producers, the dispatch engine and
//! the ingress adapters all agree on:
//! - [`MailMessage`], the immutable unit of work
//! - [`MailEnvelope`], the JSON shape carried over HTTP and NATS
//! - [`MessageComposer`], rendering subject/body text from templates
//!
//! # Example
//!
//! ```rust
//! use mail_common::{MessageComposer, TemplateComposer, MailEnvelope};
//! use serde_json::json;
//!
//! let composer = TemplateComposer::registration_confirmation().unwrap();
//! let body = composer
//!     .compose_message(&json!({ "ConfirmationLink": "http://127.0.0.1:8080/confirm" }))
//!     .unwrap();
//!
//! let envelope = MailEnvelope::new("user@example.com", "Welcome", body);
//! let message = envelope.into_message("info@suricata.com").unwrap();
//! assert_eq!(message.sender(), "info@suricata.com");
//! ```

pub mod composer;
pub mod error;
pub mod message;

pub use composer::*;
pub use error::*;
pub use message::*;

/// Directory name the mail service registers under.
pub const MAIL_SERVICE_NAME: &str = "mail";

/// NATS subject mail envelopes are published on.
pub const MAIL_TOPIC: &str = "mail";

/// Default queue group shared by all dispatch instances.
pub const DEFAULT_QUEUE_GROUP: &str = "mailgun";

/// Sender used when neither the envelope nor the configuration sets one.
pub const DEFAULT_SENDER: &str = "info@suricata.com";

/// Content type of JSON request bodies.
pub const JSON_MIME_TYPE: &str = "application/json";
