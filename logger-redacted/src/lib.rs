//! Redaction helpers for log output
//!
//! Mail recipients are personal data and must not reach log sinks verbatim.
//! Addresses are masked by shape (`j***@e***`): [`RedactedEmail`] for a
//! known recipient field, [`Redacted`] for free text such as provider errors
//! that may echo an address back.
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{redact_emails, Redacted, RedactedEmail};
//!
//! assert_eq!(
//!     redact_emails("Sending mail to john.doe@example.com"),
//!     "Sending mail to j***@e***"
//! );
//!
//! // As tracing fields:
//! // tracing::info!(recipient = %RedactedEmail("john.doe@example.com"), "Sending mail");
//! // tracing::warn!(error = %Redacted(&err), "Delivery failed");
//! assert_eq!(RedactedEmail("john.doe@example.com").to_string(), "j***@e***");
//! assert_eq!(Redacted("bounce from x@y.com").to_string(), "bounce from x***@y***");
//! ```

pub mod redactor;

pub use redactor::*;
