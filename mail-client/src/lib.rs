//! Mailgate client library
//!
//! Services that want to send mail use a [`MailClient`]. Two transports are
//! available and chosen at construction time:
//! - [`HttpMailClient`]: resolves the `mail` service through a
//!   [`DirectoryResolver`](service_directory::DirectoryResolver) and POSTs JSON
//! - [`NatsMailClient`]: publishes on the `mail` NATS subject
//!
//! Both render subject and body with a
//! [`MessageComposer`](mail_common::MessageComposer) before sending.

pub mod client;
pub mod error;
pub mod http;
pub mod nats;

pub use client::MailClient;
pub use error::*;
pub use http::HttpMailClient;
pub use nats::NatsMailClient;
