use thiserror::Error;

use crate::messenger::MessageError;

/// Errors surfaced while running operator commands
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
