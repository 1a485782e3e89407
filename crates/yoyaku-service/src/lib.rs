//! Booking workflows: turning raw collaborator input into bookings, adding
//! them to the store when they do not conflict, and building read views.

pub mod error;
pub mod request;
pub mod scheduler;

pub use error::{ServiceError, ServiceResult};
pub use request::{BookingRequest, EndSpec, RecurrenceRequest};
pub use scheduler::Scheduler;
