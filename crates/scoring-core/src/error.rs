use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Calculation error: {0}")]
    Calculation(String),
}
