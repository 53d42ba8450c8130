//! Library repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Library;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LibraryRepository: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Library>, DomainError>;
    async fn find_by_user_id(&self, user_id: &Uuid) -> Result<Option<Library>, DomainError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Library>, DomainError>;
    async fn find_by_institute_email(&self, email: &str) -> Result<Option<Library>, DomainError>;
    /// Writes every mutable column. `library_code` and `user_id` are never changed.
    async fn update(&self, library: &Library) -> Result<Library, DomainError>;
}
