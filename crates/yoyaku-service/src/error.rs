use thiserror::Error;
use yoyaku_core::types::{Booking, Occurrence};

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    CoreError(#[from] yoyaku_core::error::CoreError),

    #[error(transparent)]
    EngineError(#[from] yoyaku_engine::EngineError),

    #[error(transparent)]
    StoreError(#[from] yoyaku_store::StoreError),

    #[error("Conflict with existing booking '{}'", .0.name)]
    SchedulingConflict(Box<Booking>),

    #[error("Series overlaps itself: {} and {}", .first.start, .second.start)]
    SelfOverlappingSeries {
        first: Occurrence,
        second: Occurrence,
    },
}

impl ServiceError {
    /// The stored booking a rejected candidate collided with, if that was the cause.
    #[must_use]
    pub fn conflicting_booking(&self) -> Option<&Booking> {
        match self {
            Self::SchedulingConflict(booking) => Some(booking),
            _ => None,
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
