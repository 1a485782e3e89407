use thiserror::Error;

/// Core-level errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid date/time: {0}")]
    InvalidDateTime(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
