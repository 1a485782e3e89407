//! Persistent, insertion-ordered booking storage backed by a JSON file.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::BookingStore;
