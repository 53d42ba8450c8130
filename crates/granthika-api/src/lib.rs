//! # Granthika API
//!
//! HTTP handlers, the session extractor, form DTOs and flash redirects for
//! the accounts pages.

pub mod dto;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::{AppState, Ports};
