//! Recurrence and conflict engine for Yoyaku bookings.
//!
//! Expands bookings into concrete occurrences over a bounded window, answers
//! whether a proposed interval collides with anything already stored, and
//! groups occurrences by day for calendar views. Nothing in this crate does I/O.

pub mod agenda;
pub mod conflict;
pub mod error;
pub mod expand;
pub mod window;

pub use agenda::{Agenda, AgendaEntry};
pub use error::{EngineError, EngineResult};
pub use expand::RecurrenceEngine;
pub use window::TimeWindow;
