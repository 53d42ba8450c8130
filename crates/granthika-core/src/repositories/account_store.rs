//! Atomic account creation (port)

use async_trait::async_trait;

use crate::domain::{AdminIdentity, Library, LibrarySettings};
use crate::error::DomainError;

/// Persists a new identity, its library and the six settings aggregates
/// as one unit. Either all rows are written or none are.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Unique violations surface as `UsernameAlreadyExists`,
    /// `LibraryCodeAlreadyExists` or `EmailAlreadyExists`.
    async fn create_account(
        &self,
        identity: &AdminIdentity,
        library: &Library,
        settings: &LibrarySettings,
    ) -> Result<(), DomainError>;
}
