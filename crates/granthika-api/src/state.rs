// ============================================================================
// Granthika API - Application State
// File: crates/granthika-api/src/state.rs
// ============================================================================

use std::sync::Arc;

use granthika_core::repositories::{AccountStore, IdentityRepository, LibraryRepository, SettingsRepository};
use granthika_core::services::{
    AuthService, IdentityService, MailDispatcher, NotificationService, RegistrationService,
    SettingsService,
};
use granthika_security::JwtService;
use granthika_shared::config::AppConfig;
use granthika_shared::constants::DEFAULT_RESET_PASSWORD_LENGTH;

/// Storage adapters the services are built on.
pub struct Ports {
    pub identities: Arc<dyn IdentityRepository>,
    pub libraries: Arc<dyn LibraryRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub accounts: Arc<dyn AccountStore>,
}

impl Ports {
    /// One store serving every port, as the in-memory store does.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: IdentityRepository + LibraryRepository + SettingsRepository + AccountStore + 'static,
    {
        Self {
            identities: store.clone(),
            libraries: store.clone(),
            settings: store.clone(),
            accounts: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub registration: Arc<RegistrationService>,
    pub settings: Arc<SettingsService>,
    pub notifications: Arc<NotificationService>,
    pub service_name: String,
    /// Adds `Secure` to the session cookie.
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(ports: Ports, dispatcher: Arc<dyn MailDispatcher>, config: &AppConfig) -> Self {
        let jwt = Arc::new(JwtService::new(
            config.jwt.secret.clone(),
            config.jwt.session_expiry,
            config.jwt.remember_me_expiry,
        ));
        let identities = Arc::new(IdentityService::new(ports.identities));

        Self {
            auth: Arc::new(AuthService::new(
                identities.clone(),
                ports.libraries.clone(),
                jwt,
                DEFAULT_RESET_PASSWORD_LENGTH,
            )),
            registration: Arc::new(RegistrationService::new(
                identities.clone(),
                ports.libraries.clone(),
                ports.accounts,
                config.registration.clone(),
            )),
            settings: Arc::new(SettingsService::new(ports.settings, ports.libraries, identities)),
            notifications: Arc::new(NotificationService::new(
                dispatcher,
                config.email.brand_name.clone(),
                config.email.sign_in_url.clone(),
            )),
            service_name: config.app.name.clone(),
            secure_cookies: config.app.env == "production",
        }
    }
}
