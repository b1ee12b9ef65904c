//! Outbound mail delivery
//!
//! [`DispatchEngine`] decouples ingress from the provider call: producers
//! [`submit`](DispatchEngine::submit) a [`MailMessage`](mail_common::MailMessage)
//! and return as soon as it is queued, while a single background worker
//! hands each message to the configured [`MailProvider`].
//!
//! Providers:
//! - [`SmtpProvider`]: any SMTP relay, via `mail-send`
//! - [`MailgunProvider`]: Mailgun HTTP API
//! - [`LogProvider`]: delivery disabled, messages are logged and discarded

pub mod config;
pub mod dispatch;
pub mod error;
pub mod mailgun;
pub mod provider;
pub mod smtp;

pub use config::*;
pub use dispatch::*;
pub use error::*;
pub use mailgun::*;
pub use provider::*;
pub use smtp::*;
