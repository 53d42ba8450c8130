//! Domain errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Identity not active")]
    IdentityNotActive,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Library not found")]
    LibraryNotFound,

    #[error("Library code already exists: {0}")]
    LibraryCodeAlreadyExists(String),

    #[error("Identity already owns a library")]
    LibraryAlreadyRegistered,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password too short")]
    PasswordTooShort,

    #[error("Password too long")]
    PasswordTooLong,

    #[error("Password hash error: {0}")]
    PasswordHashError(String),

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),

    #[error("Unable to generate unique {0}")]
    UnableToGenerateUnique(&'static str),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Coarse classification used by the HTTP layer to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Duplicate,
    NotFound,
    Unauthorized,
    Internal,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::PasswordMismatch
            | DomainError::PasswordTooShort
            | DomainError::PasswordTooLong
            | DomainError::ValidationError(_) => ErrorKind::Validation,
            DomainError::EmailAlreadyExists(_)
            | DomainError::UsernameAlreadyExists(_)
            | DomainError::LibraryCodeAlreadyExists(_)
            | DomainError::LibraryAlreadyRegistered => ErrorKind::Duplicate,
            DomainError::IdentityNotFound | DomainError::LibraryNotFound => ErrorKind::NotFound,
            DomainError::InvalidCredentials | DomainError::IdentityNotActive => ErrorKind::Unauthorized,
            DomainError::PasswordHashError(_)
            | DomainError::TokenGenerationError(_)
            | DomainError::UnableToGenerateUnique(_)
            | DomainError::DatabaseError(_)
            | DomainError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Text safe to show an end user. Internal details never leak.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::EmailAlreadyExists(_) => "Email already exists.".to_string(),
            DomainError::UsernameAlreadyExists(_) => "Username already exists.".to_string(),
            DomainError::LibraryAlreadyRegistered => {
                "This account already has a library.".to_string()
            }
            DomainError::PasswordMismatch => "Passwords do not match.".to_string(),
            DomainError::PasswordTooShort => "Password must be at least 8 characters.".to_string(),
            DomainError::PasswordTooLong => "Password is too long.".to_string(),
            DomainError::ValidationError(msg) => msg.clone(),
            DomainError::InvalidCredentials | DomainError::IdentityNotActive => {
                "Invalid username or password.".to_string()
            }
            DomainError::IdentityNotFound | DomainError::LibraryNotFound => {
                "No library found for your account.".to_string()
            }
            _ => "Something went wrong.".to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for {}.", field),
                })
            })
            .next()
            .unwrap_or_else(|| "Invalid input.".to_string());
        DomainError::ValidationError(message)
    }
}
