// ============================================================================
// Granthika Infrastructure - PostgreSQL Account Store
// File: crates/granthika-infrastructure/src/database/postgres/account_store_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use granthika_core::domain::{AdminIdentity, Library, LibrarySettings};
use granthika_core::error::DomainError;
use granthika_core::repositories::AccountStore;

use super::identity_repo_impl::insert_identity;
use super::library_repo_impl::insert_library;
use super::settings_repo_impl::{write_aggregate, OnConflict};
use crate::database::constraints::read_error;

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create_account(
        &self,
        identity: &AdminIdentity,
        library: &Library,
        settings: &LibrarySettings,
    ) -> Result<(), DomainError> {
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|e| read_error("starting account transaction", e))?;

        // Dropping the transaction on any early return rolls it back.
        insert_identity(&mut *transaction, identity).await?;
        insert_library(&mut *transaction, library).await?;
        for aggregate in settings.clone().into_aggregates() {
            write_aggregate(&mut *transaction, &aggregate, OnConflict::Ignore).await?;
            debug!("Provisioned {} for library {}", aggregate.kind().as_str(), library.id);
        }

        transaction
            .commit()
            .await
            .map_err(|e| read_error("committing account transaction", e))?;

        info!("Account created: identity {} library {}", identity.id, library.library_code);
        Ok(())
    }
}
