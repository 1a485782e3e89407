//! Yoyaku booking scheduler - shared model, parsing and configuration.
//!
//! Everything here is free of I/O apart from configuration loading.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod util;
