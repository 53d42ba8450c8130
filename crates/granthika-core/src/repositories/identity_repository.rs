//! Admin identity repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::AdminIdentity;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AdminIdentity>, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<AdminIdentity>, DomainError>;
    /// Case-insensitive; callers pass the normalized address.
    async fn find_by_email(&self, email: &str) -> Result<Option<AdminIdentity>, DomainError>;
    /// Fails with `EmailAlreadyExists` when the new email belongs to someone else.
    async fn update(&self, identity: &AdminIdentity) -> Result<AdminIdentity, DomainError>;
}
