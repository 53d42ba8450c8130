// ============================================================================
// Granthika Core - Authentication Service
// File: crates/granthika-core/src/services/auth_service.rs
// ============================================================================
//! Sign-in, session token checks and forgotten-password resets.

use std::sync::Arc;

use granthika_security::{generate_random_password, JwtError, JwtService};
use granthika_shared::utils::mask_email;
use tracing::{error, info, warn};

use crate::domain::AdminIdentity;
use crate::error::DomainError;
use crate::repositories::LibraryRepository;
use crate::services::identity_service::IdentityService;

/// Fallback library name for identities without a library.
const UNNAMED_LIBRARY: &str = "Library";

#[derive(Debug, Clone)]
pub struct SignInResult {
    pub identity: AdminIdentity,
    pub token: String,
    /// Cookie lifetime in seconds. `None` makes a browser-session cookie.
    pub max_age: Option<i64>,
    /// True when this is the identity's first successful sign-in.
    pub first_login: bool,
}

#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub identity: AdminIdentity,
    pub new_password: String,
    pub library_name: String,
}

pub struct AuthService {
    identities: Arc<IdentityService>,
    libraries: Arc<dyn LibraryRepository>,
    jwt: Arc<JwtService>,
    reset_password_length: usize,
}

impl AuthService {
    pub fn new(
        identities: Arc<IdentityService>,
        libraries: Arc<dyn LibraryRepository>,
        jwt: Arc<JwtService>,
        reset_password_length: usize,
    ) -> Self {
        Self {
            identities,
            libraries,
            jwt,
            reset_password_length,
        }
    }

    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
        remember: bool,
    ) -> Result<SignInResult, DomainError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(DomainError::ValidationError(
                "Please enter username and password.".to_string(),
            ));
        }

        let identity = self.identities.verify(username, password).await?;
        let first_login = identity.is_first_login();

        let token = self
            .jwt
            .generate_session_token(&identity.id, remember)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        let recorded = self.identities.record_login(&identity).await;
        let identity = match recorded {
            Ok(updated) => updated,
            Err(e) => {
                // Sign-in still succeeds.
                error!("Failed to record last login for {}: {}", identity.id, e);
                identity
            }
        };

        info!("Admin {} signed in", identity.username);
        Ok(SignInResult {
            identity,
            token,
            max_age: remember.then(|| self.jwt.expiry_for(true)),
            first_login,
        })
    }

    /// Resolves a session token to an active identity.
    pub async fn authenticate_token(&self, token: &str) -> Result<AdminIdentity, DomainError> {
        let claims = self.jwt.validate_token(token).map_err(|e| {
            match e {
                JwtError::TokenExpired => info!("Session token expired"),
                _ => warn!("Session token rejected: {}", e),
            }
            DomainError::InvalidCredentials
        })?;
        let identity_id = claims
            .identity_id()
            .map_err(|_| DomainError::InvalidCredentials)?;

        match self.identities.find_by_id(&identity_id).await? {
            Some(identity) if identity.is_active => Ok(identity),
            _ => Err(DomainError::InvalidCredentials),
        }
    }

    /// Sets a generated password when `email` belongs to an identity.
    ///
    /// `Ok(None)` for unknown addresses; callers answer the same way in both cases.
    pub async fn reset_password(&self, email: &str) -> Result<Option<PasswordReset>, DomainError> {
        let identity = match self.identities.find_by_email(email).await? {
            Some(identity) => identity,
            None => {
                info!("Password reset requested for unknown {}", mask_email(email));
                return Ok(None);
            }
        };

        let new_password = generate_random_password(self.reset_password_length);
        let identity = self.identities.set_secret(&identity, &new_password).await?;
        let library_name = self
            .libraries
            .find_by_user_id(&identity.id)
            .await?
            .map(|library| library.library_name)
            .unwrap_or_else(|| UNNAMED_LIBRARY.to_string());

        info!("Password reset for {}", mask_email(&identity.email));
        Ok(Some(PasswordReset {
            identity,
            new_password,
            library_name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{MockIdentityRepository, MockLibraryRepository};
    use granthika_security::PasswordService;

    fn stored() -> AdminIdentity {
        AdminIdentity::new(
            "DG909090".into(),
            "head@library.in".into(),
            PasswordService::hash("password123").unwrap(),
            "Tara Bose".into(),
        )
    }

    fn service(identities: MockIdentityRepository, libraries: MockLibraryRepository) -> AuthService {
        AuthService::new(
            Arc::new(IdentityService::new(Arc::new(identities))),
            Arc::new(libraries),
            Arc::new(JwtService::new("test-secret".into(), 3600, 604_800)),
            10,
        )
    }

    #[tokio::test]
    async fn test_sign_in_requires_both_fields() {
        let service = service(MockIdentityRepository::new(), MockLibraryRepository::new());
        let err = service.sign_in("  ", "password123", false).await.unwrap_err();
        assert_eq!(err.user_message(), "Please enter username and password.");
    }

    #[tokio::test]
    async fn test_sign_in_first_login_and_remember_me() {
        let identity = stored();
        let mut identities = MockIdentityRepository::new();
        identities
            .expect_find_by_username()
            .returning(move |_| Ok(Some(identity.clone())));
        identities.expect_update().times(1).returning(|i| Ok(i.clone()));

        let service = service(identities, MockLibraryRepository::new());
        let result = service.sign_in("DG909090", "password123", true).await.unwrap();
        assert!(result.first_login);
        assert!(result.identity.last_login.is_some());
        assert_eq!(result.max_age, Some(604_800));
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let identity = stored();
        let lookup = identity.clone();
        let mut identities = MockIdentityRepository::new();
        identities
            .expect_find_by_id()
            .returning(move |_| Ok(Some(lookup.clone())));

        let service = service(identities, MockLibraryRepository::new());
        let token = service.jwt.generate_session_token(&identity.id, false).unwrap();
        assert_eq!(service.authenticate_token(&token).await.unwrap().id, identity.id);
        assert_eq!(
            service.authenticate_token("garbage").await.unwrap_err(),
            DomainError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn test_reset_password_unknown_email_is_silent() {
        let mut identities = MockIdentityRepository::new();
        identities.expect_find_by_email().returning(|_| Ok(None));
        identities.expect_update().never();

        let service = service(identities, MockLibraryRepository::new());
        assert!(service.reset_password("nobody@nowhere.in").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_password_sets_generated_secret() {
        let identity = stored();
        let mut identities = MockIdentityRepository::new();
        identities
            .expect_find_by_email()
            .returning(move |_| Ok(Some(identity.clone())));
        identities.expect_update().returning(|i| Ok(i.clone()));
        let mut libraries = MockLibraryRepository::new();
        libraries.expect_find_by_user_id().returning(|_| Ok(None));

        let service = service(identities, libraries);
        let reset = service.reset_password("HEAD@library.in").await.unwrap().unwrap();
        assert_eq!(reset.new_password.len(), 10);
        assert_eq!(reset.library_name, "Library");
        assert!(IdentityService::check_secret(&reset.identity, &reset.new_password));
    }
}
