//! In-process store implementing every repository port.
//!
//! Backs `memory://` development runs and the integration tests. Uniqueness
//! rules mirror the database constraints and account creation happens under
//! one write lock, so it is all-or-nothing like the PostgreSQL transaction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use granthika_core::domain::{AdminIdentity, AggregateKind, Library, LibrarySettings, SettingsAggregate};
use granthika_core::error::DomainError;
use granthika_core::repositories::{AccountStore, IdentityRepository, LibraryRepository, SettingsRepository};

#[derive(Default)]
struct MemoryState {
    identities: HashMap<Uuid, AdminIdentity>,
    libraries: HashMap<Uuid, Library>,
    settings: HashMap<(Uuid, AggregateKind), SettingsAggregate>,
}

impl MemoryState {
    fn identity_conflict(&self, identity: &AdminIdentity) -> Option<DomainError> {
        self.identities
            .values()
            .filter(|other| other.id != identity.id)
            .find_map(|other| {
                if other.username == identity.username {
                    Some(DomainError::UsernameAlreadyExists(identity.username.clone()))
                } else if other.email.eq_ignore_ascii_case(&identity.email) {
                    Some(DomainError::EmailAlreadyExists(identity.email.clone()))
                } else {
                    None
                }
            })
    }

    fn library_conflict(&self, library: &Library) -> Option<DomainError> {
        self.libraries
            .values()
            .filter(|other| other.id != library.id)
            .find_map(|other| {
                if other.user_id == library.user_id {
                    Some(DomainError::LibraryAlreadyRegistered)
                } else if other.library_code == library.library_code {
                    Some(DomainError::LibraryCodeAlreadyExists(library.library_code.clone()))
                } else if other.institute_email.eq_ignore_ascii_case(&library.institute_email) {
                    Some(DomainError::EmailAlreadyExists(library.institute_email.clone()))
                } else {
                    None
                }
            })
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of settings aggregates held for `library_id`.
    pub async fn aggregate_count(&self, library_id: &Uuid) -> usize {
        let state = self.state.read().await;
        state.settings.keys().filter(|(id, _)| id == library_id).count()
    }

    pub async fn identity_count(&self) -> usize {
        self.state.read().await.identities.len()
    }

    pub async fn library_count(&self) -> usize {
        self.state.read().await.libraries.len()
    }

    /// Drops one aggregate, as a library created before it existed would lack it.
    pub async fn remove_aggregate(&self, library_id: &Uuid, kind: AggregateKind) -> bool {
        let mut state = self.state.write().await;
        state.settings.remove(&(*library_id, kind)).is_some()
    }
}

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<AdminIdentity>, DomainError> {
        Ok(self.state.read().await.identities.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AdminIdentity>, DomainError> {
        let state = self.state.read().await;
        Ok(state.identities.values().find(|i| i.username == username).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AdminIdentity>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .identities
            .values()
            .find(|i| i.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update(&self, identity: &AdminIdentity) -> Result<AdminIdentity, DomainError> {
        let mut state = self.state.write().await;
        if !state.identities.contains_key(&identity.id) {
            return Err(DomainError::IdentityNotFound);
        }
        if let Some(conflict) = state.identity_conflict(identity) {
            return Err(conflict);
        }
        state.identities.insert(identity.id, identity.clone());
        Ok(identity.clone())
    }
}

#[async_trait]
impl LibraryRepository for MemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Library>, DomainError> {
        Ok(self.state.read().await.libraries.get(id).cloned())
    }

    async fn find_by_user_id(&self, user_id: &Uuid) -> Result<Option<Library>, DomainError> {
        let state = self.state.read().await;
        Ok(state.libraries.values().find(|l| l.user_id == *user_id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Library>, DomainError> {
        let state = self.state.read().await;
        Ok(state.libraries.values().find(|l| l.library_code == code).cloned())
    }

    async fn find_by_institute_email(&self, email: &str) -> Result<Option<Library>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .libraries
            .values()
            .find(|l| l.institute_email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn update(&self, library: &Library) -> Result<Library, DomainError> {
        let mut state = self.state.write().await;
        let stored = state
            .libraries
            .get(&library.id)
            .cloned()
            .ok_or(DomainError::LibraryNotFound)?;
        if let Some(conflict) = state.library_conflict(library) {
            return Err(conflict);
        }

        let updated = Library {
            user_id: stored.user_id,
            library_code: stored.library_code,
            created_at: stored.created_at,
            ..library.clone()
        };
        state.libraries.insert(updated.id, updated.clone());
        Ok(updated)
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn find(
        &self,
        library_id: &Uuid,
        kind: AggregateKind,
    ) -> Result<Option<SettingsAggregate>, DomainError> {
        Ok(self.state.read().await.settings.get(&(*library_id, kind)).cloned())
    }

    async fn insert_if_absent(
        &self,
        aggregate: &SettingsAggregate,
    ) -> Result<SettingsAggregate, DomainError> {
        let mut state = self.state.write().await;
        let stored = state
            .settings
            .entry((aggregate.library_id(), aggregate.kind()))
            .or_insert_with(|| aggregate.clone());
        Ok(stored.clone())
    }

    async fn save(&self, aggregate: &SettingsAggregate) -> Result<SettingsAggregate, DomainError> {
        let mut state = self.state.write().await;
        state
            .settings
            .insert((aggregate.library_id(), aggregate.kind()), aggregate.clone());
        Ok(aggregate.clone())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(
        &self,
        identity: &AdminIdentity,
        library: &Library,
        settings: &LibrarySettings,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;

        // Check everything before the first write.
        if let Some(conflict) = state.identity_conflict(identity) {
            return Err(conflict);
        }
        if let Some(conflict) = state.library_conflict(library) {
            return Err(conflict);
        }

        state.identities.insert(identity.id, identity.clone());
        state.libraries.insert(library.id, library.clone());
        for aggregate in settings.clone().into_aggregates() {
            debug!("Provisioned {} for library {}", aggregate.kind().as_str(), library.id);
            state
                .settings
                .entry((aggregate.library_id(), aggregate.kind()))
                .or_insert(aggregate);
        }

        info!("Account created: identity {} library {}", identity.id, library.library_code);
        Ok(())
    }
}
