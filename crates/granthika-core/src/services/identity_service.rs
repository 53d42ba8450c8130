// ============================================================================
// Granthika Core - Identity Service
// File: crates/granthika-core/src/services/identity_service.rs
// ============================================================================
//! Identity provider: builds admin identities and checks their secrets.

use std::sync::Arc;

use granthika_security::PasswordService;
use granthika_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use granthika_shared::utils::mask_email;
use tracing::{info, warn};

use crate::domain::AdminIdentity;
use crate::error::DomainError;
use crate::repositories::IdentityRepository;

/// Length rules shared by registration, password change and reset.
pub fn validate_secret(secret: &str) -> Result<(), DomainError> {
    let length = secret.chars().count();
    if length < MIN_PASSWORD_LENGTH {
        return Err(DomainError::PasswordTooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(DomainError::PasswordTooLong);
    }
    Ok(())
}

pub struct IdentityService {
    identities: Arc<dyn IdentityRepository>,
}

impl IdentityService {
    pub fn new(identities: Arc<dyn IdentityRepository>) -> Self {
        Self { identities }
    }

    /// Builds an unsaved identity with a hashed secret.
    ///
    /// The handle is checked here; the store's unique constraint still
    /// guards the race between this check and the insert.
    pub async fn create_identity(
        &self,
        handle: &str,
        email: &str,
        secret: &str,
        display_name: &str,
    ) -> Result<AdminIdentity, DomainError> {
        if self.identities.find_by_username(handle).await?.is_some() {
            return Err(DomainError::UsernameAlreadyExists(handle.to_string()));
        }

        let hash = hash_secret(secret)?;
        Ok(AdminIdentity::new(
            handle.to_string(),
            email.to_string(),
            hash,
            display_name.to_string(),
        ))
    }

    /// Looks up `handle` and checks `secret`. Every failure is `InvalidCredentials`.
    pub async fn verify(&self, handle: &str, secret: &str) -> Result<AdminIdentity, DomainError> {
        let identity = self
            .identities
            .find_by_username(handle)
            .await?
            .ok_or_else(|| {
                warn!("Sign-in rejected: unknown username");
                DomainError::InvalidCredentials
            })?;

        if !identity.is_active {
            warn!("Sign-in rejected: identity {} is inactive", identity.id);
            return Err(DomainError::InvalidCredentials);
        }

        if !Self::check_secret(&identity, secret) {
            warn!("Sign-in rejected: wrong password for identity {}", identity.id);
            return Err(DomainError::InvalidCredentials);
        }
        Ok(identity)
    }

    pub fn check_secret(identity: &AdminIdentity, candidate: &str) -> bool {
        PasswordService::verify(candidate, &identity.password_hash).unwrap_or(false)
    }

    /// Hashes and stores a new secret.
    pub async fn set_secret(
        &self,
        identity: &AdminIdentity,
        new_secret: &str,
    ) -> Result<AdminIdentity, DomainError> {
        validate_secret(new_secret)?;

        let mut updated = identity.clone();
        updated.password_hash = hash_secret(new_secret)?;
        updated.modified_at = Some(chrono::Utc::now());

        let saved = self.identities.update(&updated).await?;
        info!("Password changed for {}", mask_email(&saved.email));
        Ok(saved)
    }

    pub async fn record_login(&self, identity: &AdminIdentity) -> Result<AdminIdentity, DomainError> {
        let mut updated = identity.clone();
        updated.record_login();
        self.identities.update(&updated).await
    }

    pub async fn update(&self, identity: &AdminIdentity) -> Result<AdminIdentity, DomainError> {
        self.identities.update(identity).await
    }

    pub async fn find_by_id(&self, id: &uuid::Uuid) -> Result<Option<AdminIdentity>, DomainError> {
        self.identities.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<AdminIdentity>, DomainError> {
        self.identities
            .find_by_email(&granthika_shared::utils::normalize_email(email))
            .await
    }

    pub async fn username_taken(&self, handle: &str) -> Result<bool, DomainError> {
        Ok(self.identities.find_by_username(handle).await?.is_some())
    }
}

fn hash_secret(secret: &str) -> Result<String, DomainError> {
    PasswordService::hash(secret).map_err(|e| DomainError::PasswordHashError(e.to_string()))
}
