use thiserror::Error;

/// Application-level errors (CLI layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] yoyaku_service::ServiceError),

    #[error("No calendar for month {month} of {year}")]
    InvalidMonth { year: i32, month: u32 },
}

pub type AppResult<T> = std::result::Result<T, AppError>;
