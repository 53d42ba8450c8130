//! # Granthika Shared
//!
//! Configuration, telemetry, constants and small helpers shared by every
//! accounts crate.

pub mod constants;
pub mod types;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
