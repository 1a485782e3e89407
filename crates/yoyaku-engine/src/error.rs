use thiserror::Error;

/// Recurrence engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("RRule error: {0}")]
    RRuleError(#[from] rrule::RRuleError),

    #[error(transparent)]
    CoreError(#[from] yoyaku_core::error::CoreError),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
