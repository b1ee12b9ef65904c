use thiserror::Error;

/// Failure while building a mail message
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Invalid mail message: {0}")]
    InvalidMessage(String),
}

/// Template parsing or rendering failure.
///
/// Recoverable: callers that choose to ignore it fall back to an empty string.
#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Template '{name}' could not be parsed: {reason}")]
    InvalidTemplate { name: String, reason: String },

    #[error("Template '{name}' could not be rendered: {reason}")]
    Render { name: String, reason: String },
}

pub type MailResult<T> = Result<T, MailError>;
