pub mod auth;

pub use auth::{clear_session_cookie, session_cookie, CurrentAdmin};
