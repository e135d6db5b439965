use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignerdError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown keyword: {0}")]
    Keyword(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SignerdError>;
