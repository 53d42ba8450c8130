// ============================================================================
// Granthika Core - Registration Service
// File: crates/granthika-core/src/services/registration_service.rs
// ============================================================================
//! Tenant registry: signs up a library together with its admin identity.

use std::sync::Arc;

use chrono::Utc;
use granthika_security::{generate_library_code, generate_username};
use granthika_shared::config::RegistrationSettings;
use granthika_shared::utils::{mask_email, normalize_email};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::domain::{AdminIdentity, Library, LibraryProfile};
use crate::error::DomainError;
use crate::repositories::{AccountStore, LibraryRepository};
use crate::services::identity_service::{validate_secret, IdentityService};
use crate::services::settings_service::SettingsService;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegistrationRequest {
    pub profile: LibraryProfile,

    #[validate(length(min = 1, max = 150, message = "Admin full name is required."))]
    pub admin_full_name: String,

    pub admin_password: String,
    pub admin_confirm_password: String,
}

/// Result of a successful sign-up. The username was generated.
#[derive(Debug, Clone)]
pub struct Registration {
    pub identity: AdminIdentity,
    pub library: Library,
}

pub struct RegistrationService {
    identities: Arc<IdentityService>,
    libraries: Arc<dyn LibraryRepository>,
    store: Arc<dyn AccountStore>,
    settings: RegistrationSettings,
}

impl RegistrationService {
    pub fn new(
        identities: Arc<IdentityService>,
        libraries: Arc<dyn LibraryRepository>,
        store: Arc<dyn AccountStore>,
        settings: RegistrationSettings,
    ) -> Self {
        Self {
            identities,
            libraries,
            store,
            settings,
        }
    }

    /// Creates identity, library and the six settings aggregates in one
    /// store operation. Sends no email.
    pub async fn register(&self, request: RegistrationRequest) -> Result<Registration, DomainError> {
        request.validate()?;

        let email = normalize_email(&request.profile.institute_email);
        info!("Registration attempt for {}", mask_email(&email));

        if self.identities.find_by_email(&email).await?.is_some()
            || self.libraries.find_by_institute_email(&email).await?.is_some()
        {
            warn!("Registration rejected: {} already in use", mask_email(&email));
            return Err(DomainError::EmailAlreadyExists(email));
        }

        if request.admin_password != request.admin_confirm_password {
            return Err(DomainError::PasswordMismatch);
        }
        validate_secret(&request.admin_password)?;

        let username = self.unused_username().await?;
        let mut identity = self
            .identities
            .create_identity(
                &username,
                &email,
                &request.admin_password,
                &request.admin_full_name,
            )
            .await?;

        let code = self.unused_library_code().await?;
        let mut library = Library::new(identity.id, code, request.profile)?;

        // The lookups above can race another sign-up; the store's unique
        // constraints are authoritative, so conflicts draw a fresh value.
        let mut attempts = 0;
        loop {
            attempts += 1;
            let settings = SettingsService::provision_defaults(library.id, Utc::now());

            match self.store.create_account(&identity, &library, &settings).await {
                Ok(()) => break,
                Err(DomainError::LibraryCodeAlreadyExists(code))
                    if attempts < self.settings.max_generation_attempts =>
                {
                    warn!("Library code {} collided, regenerating", code);
                    library = library.with_code(self.fresh_library_code());
                }
                Err(DomainError::UsernameAlreadyExists(taken))
                    if attempts < self.settings.max_generation_attempts =>
                {
                    warn!("Username {} collided, regenerating", taken);
                    identity.username = self.fresh_username();
                }
                Err(DomainError::LibraryCodeAlreadyExists(_)) => {
                    return Err(DomainError::UnableToGenerateUnique("library code"));
                }
                Err(DomainError::UsernameAlreadyExists(_)) => {
                    return Err(DomainError::UnableToGenerateUnique("username"));
                }
                Err(e) => {
                    if e.kind() == crate::ErrorKind::Internal {
                        error!("Registration failed for {}: {}", mask_email(&email), e);
                    }
                    return Err(e);
                }
            }
        }

        info!(
            "Library {} registered with admin {}",
            library.library_code, identity.username
        );
        Ok(Registration { identity, library })
    }

    pub async fn find_by_identity(&self, identity_id: &Uuid) -> Result<Library, DomainError> {
        self.libraries
            .find_by_user_id(identity_id)
            .await?
            .ok_or(DomainError::LibraryNotFound)
    }

    async fn unused_username(&self) -> Result<String, DomainError> {
        for _ in 0..self.settings.max_generation_attempts {
            let candidate = self.fresh_username();
            if !self.identities.username_taken(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(DomainError::UnableToGenerateUnique("username"))
    }

    async fn unused_library_code(&self) -> Result<String, DomainError> {
        for _ in 0..self.settings.max_generation_attempts {
            let candidate = self.fresh_library_code();
            if self.libraries.find_by_code(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(DomainError::UnableToGenerateUnique("library code"))
    }

    fn fresh_username(&self) -> String {
        generate_username(&self.settings.username_prefix, self.settings.username_digits)
    }

    fn fresh_library_code(&self) -> String {
        generate_library_code(&self.settings.code_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InstituteType;
    use crate::repositories::{MockAccountStore, MockIdentityRepository, MockLibraryRepository};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn request(password: &str, confirm: &str) -> RegistrationRequest {
        RegistrationRequest {
            profile: LibraryProfile {
                library_name: "Hill Library".into(),
                institute_name: "Hill School".into(),
                institute_type: InstituteType::GovernmentUrban,
                institute_email: "Office@HillSchool.in".into(),
                phone_number: Some("9800000000".into()),
                address: "Station Road".into(),
                district: "Darjeeling".into(),
                state: "West Bengal".into(),
                country: "India".into(),
            },
            admin_full_name: "Mina Tamang".into(),
            admin_password: password.into(),
            admin_confirm_password: confirm.into(),
        }
    }

    fn empty_identities() -> MockIdentityRepository {
        let mut identities = MockIdentityRepository::new();
        identities.expect_find_by_email().returning(|_| Ok(None));
        identities.expect_find_by_username().returning(|_| Ok(None));
        identities
    }

    fn empty_libraries() -> MockLibraryRepository {
        let mut libraries = MockLibraryRepository::new();
        libraries.expect_find_by_institute_email().returning(|_| Ok(None));
        libraries.expect_find_by_code().returning(|_| Ok(None));
        libraries
    }

    fn service(
        identities: MockIdentityRepository,
        libraries: MockLibraryRepository,
        store: MockAccountStore,
        max_attempts: u32,
    ) -> RegistrationService {
        RegistrationService::new(
            Arc::new(IdentityService::new(Arc::new(identities))),
            Arc::new(libraries),
            Arc::new(store),
            RegistrationSettings {
                max_generation_attempts: max_attempts,
                ..RegistrationSettings::default()
            },
        )
    }

    #[tokio::test]
    async fn test_register_persists_everything_once() {
        let mut store = MockAccountStore::new();
        store
            .expect_create_account()
            .times(1)
            .withf(|identity, library, settings| {
                library.user_id == identity.id
                    && settings.rules.library_id == library.id
                    && settings.subscription.library_id == library.id
            })
            .returning(|_, _, _| Ok(()));

        let service = service(empty_identities(), empty_libraries(), store, 20);
        let registration = service.register(request("password123", "password123")).await.unwrap();

        assert_eq!(registration.identity.email, "office@hillschool.in");
        assert_eq!(registration.library.institute_email, "office@hillschool.in");
        assert!(registration.identity.username.starts_with("DG"));
        assert_eq!(registration.identity.username.len(), 8);
        assert!(registration.library.library_code.starts_with("DG-"));
    }

    #[tokio::test]
    async fn test_register_rejects_known_email() {
        let mut identities = MockIdentityRepository::new();
        identities.expect_find_by_email().returning(|email| {
            Ok(Some(AdminIdentity::new(
                "DG111111".into(),
                email.into(),
                "hash".into(),
                "Someone".into(),
            )))
        });
        let mut store = MockAccountStore::new();
        store.expect_create_account().never();

        let service = service(identities, empty_libraries(), store, 20);
        let result = service.register(request("password123", "password123")).await;
        assert_eq!(
            result.unwrap_err(),
            DomainError::EmailAlreadyExists("office@hillschool.in".into())
        );
    }

    #[tokio::test]
    async fn test_register_password_mismatch_and_length() {
        let mut store = MockAccountStore::new();
        store.expect_create_account().never();
        let service = service(empty_identities(), empty_libraries(), store, 20);

        assert_eq!(
            service.register(request("password123", "password124")).await.unwrap_err(),
            DomainError::PasswordMismatch
        );
        assert_eq!(
            service.register(request("short", "short")).await.unwrap_err(),
            DomainError::PasswordTooShort
        );
    }

    #[tokio::test]
    async fn test_register_retries_code_collision() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let mut store = MockAccountStore::new();
        store.expect_create_account().returning(move |_, library, _| {
            if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(DomainError::LibraryCodeAlreadyExists(library.library_code.clone()))
            } else {
                Ok(())
            }
        });

        let service = service(empty_identities(), empty_libraries(), store, 20);
        assert!(service.register(request("password123", "password123")).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_register_gives_up_after_bounded_attempts() {
        let mut store = MockAccountStore::new();
        store
            .expect_create_account()
            .times(3)
            .returning(|_, library, _| Err(DomainError::LibraryCodeAlreadyExists(library.library_code.clone())));

        let service = service(empty_identities(), empty_libraries(), store, 3);
        assert_eq!(
            service.register(request("password123", "password123")).await.unwrap_err(),
            DomainError::UnableToGenerateUnique("library code")
        );
    }

    #[tokio::test]
    async fn test_find_by_identity_missing() {
        let mut libraries = MockLibraryRepository::new();
        libraries.expect_find_by_user_id().returning(|_| Ok(None));

        let service = service(empty_identities(), libraries, MockAccountStore::new(), 20);
        assert_eq!(
            service.find_by_identity(&Uuid::new_v4()).await.unwrap_err(),
            DomainError::LibraryNotFound
        );
    }
}
