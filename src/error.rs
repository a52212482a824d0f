//! Crate-wide error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: '{0}'")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, ProxError>;
