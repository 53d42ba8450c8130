//! Domain services (business logic)

pub mod auth_service;
pub mod identity_service;
pub mod notification_service;
pub mod registration_service;
pub mod settings_service;

pub use auth_service::{AuthService, PasswordReset, SignInResult};
pub use identity_service::IdentityService;
pub use notification_service::{MailDispatcher, MailKind, NotificationService};
pub use registration_service::{Registration, RegistrationRequest, RegistrationService};
pub use settings_service::{SectionOutcome, SettingsService};
