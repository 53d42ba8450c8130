//! Email delivery: handlebars rendering and the lettre SMTP dispatcher.

pub mod sender;
pub mod template;

pub use sender::{DisabledMailDispatcher, SmtpMailDispatcher};
pub use template::{RenderedMail, TemplateEngine};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Email configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid address: {0}")]
    AddressError(String),

    #[error("SMTP delivery failed: {0}")]
    TransportError(String),
}
