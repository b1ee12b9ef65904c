use mail_common::MailError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Mail dispatcher not initialized")]
    NotInitialized,

    #[error("Mail dispatcher is closed")]
    EngineClosed,

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<MailError> for EmailError {
    fn from(err: MailError) -> Self {
        EmailError::InvalidMessage(err.to_string())
    }
}

pub type EmailResult<T> = Result<T, EmailError>;
