//! Settings aggregate repository trait (port)

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AggregateKind, SettingsAggregate};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn find(
        &self,
        library_id: &Uuid,
        kind: AggregateKind,
    ) -> Result<Option<SettingsAggregate>, DomainError>;

    /// Inserts unless the library already has an aggregate of that kind,
    /// then returns whichever row is stored.
    async fn insert_if_absent(
        &self,
        aggregate: &SettingsAggregate,
    ) -> Result<SettingsAggregate, DomainError>;

    async fn save(&self, aggregate: &SettingsAggregate) -> Result<SettingsAggregate, DomainError>;
}
