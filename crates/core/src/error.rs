use thiserror::Error;

pub type RecResult<T> = Result<T, RecError>;

#[derive(Error, Debug)]
pub enum RecError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset unavailable: {0}")]
    DataUnavailable(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
