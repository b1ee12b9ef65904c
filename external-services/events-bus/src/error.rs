use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Event serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Event publishing failed: {0}")]
    PublishError(String),

    #[error("Event subscription failed: {0}")]
    SubscriptionError(String),

    #[error("Event broker connection failed: {0}")]
    BrokerConnectionError(String),
}

pub type Result<T> = std::result::Result<T, EventBusError>;
