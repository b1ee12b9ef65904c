use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("Cannot resolve service host: no instances registered for '{service}'")]
    NotFound { service: String },

    #[error("Service directory unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid service address '{0}'")]
    InvalidAddress(String),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;
