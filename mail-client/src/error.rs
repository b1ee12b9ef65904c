use events_bus::EventBusError;
use service_directory::DirectoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailClientError {
    #[error("Mail client not initialized: {0}")]
    NotInitialized(&'static str),

    #[error("Invalid mail: {0}")]
    InvalidMessage(String),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Mail service responded with status {0}")]
    Status(u16),

    #[error("Publish failed: {0}")]
    Bus(#[from] EventBusError),
}

pub type MailClientResult<T> = Result<T, MailClientError>;
