//! Publish/subscribe transport for Mailgate
//!
//! This module wraps a NATS connection with the two operations the mail
//! system needs:
//! - JSON publish on a subject, fire-and-forget
//! - Queue-group subscription, so that several dispatch instances share one
//!   inbound stream without duplicate delivery
//!
//! # Example
//!
//! ```rust,no_run
//! use events_bus::{NatsBroker, NatsConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = NatsBroker::connect(&NatsConfig::default()).await?;
//!
//!     bus.queue_subscribe_json("mail", "mailgun", |mail: serde_json::Value| async move {
//!         println!("Received mail: {mail}");
//!     })
//!     .await?;
//!
//!     bus.publish_json("mail", &json!({ "Recipient": "user@example.com" })).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod nats;

pub use error::*;
pub use nats::*;
