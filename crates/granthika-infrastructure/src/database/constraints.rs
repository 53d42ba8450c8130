//! Maps unique-constraint violations onto domain errors.

use granthika_core::domain::{AdminIdentity, Library};
use granthika_core::error::DomainError;
use tracing::error;

pub const IDENTITY_USERNAME_KEY: &str = "admin_identities_username_key";
pub const IDENTITY_EMAIL_KEY: &str = "admin_identities_email_key";
pub const LIBRARY_USER_KEY: &str = "libraries_user_id_key";
pub const LIBRARY_CODE_KEY: &str = "libraries_library_code_key";
pub const LIBRARY_EMAIL_KEY: &str = "libraries_institute_email_key";

/// Rows involved in a write, used to fill in the duplicate value.
#[derive(Default, Clone, Copy)]
pub struct WriteSubject<'a> {
    pub identity: Option<&'a AdminIdentity>,
    pub library: Option<&'a Library>,
}

pub fn write_error(context: &str, e: sqlx::Error, subject: WriteSubject<'_>) -> DomainError {
    let constraint = e
        .as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_string);

    let identity_email = || subject.identity.map(|i| i.email.clone()).unwrap_or_default();
    let library_email = || subject.library.map(|l| l.institute_email.clone()).unwrap_or_default();

    match constraint.as_deref() {
        Some(IDENTITY_USERNAME_KEY) => DomainError::UsernameAlreadyExists(
            subject.identity.map(|i| i.username.clone()).unwrap_or_default(),
        ),
        Some(IDENTITY_EMAIL_KEY) => DomainError::EmailAlreadyExists(identity_email()),
        Some(LIBRARY_EMAIL_KEY) => DomainError::EmailAlreadyExists(library_email()),
        Some(LIBRARY_CODE_KEY) => DomainError::LibraryCodeAlreadyExists(
            subject.library.map(|l| l.library_code.clone()).unwrap_or_default(),
        ),
        Some(LIBRARY_USER_KEY) => DomainError::LibraryAlreadyRegistered,
        _ => read_error(context, e),
    }
}

pub fn read_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("Database error {}: {}", context, e);
    DomainError::DatabaseError(e.to_string())
}
