//! # Granthika Core
//!
//! Library (tenant) registration, administrator identities and the six
//! per-library settings aggregates, with the repository traits the
//! infrastructure crate implements.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, ErrorKind};
