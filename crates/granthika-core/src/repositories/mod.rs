//! Repository traits (ports)

pub mod account_store;
pub mod identity_repository;
pub mod library_repository;
pub mod settings_repository;

pub use account_store::AccountStore;
pub use identity_repository::IdentityRepository;
pub use library_repository::LibraryRepository;
pub use settings_repository::SettingsRepository;

#[cfg(test)]
pub use account_store::MockAccountStore;
#[cfg(test)]
pub use identity_repository::MockIdentityRepository;
#[cfg(test)]
pub use library_repository::MockLibraryRepository;
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
