//! PostgreSQL repository implementations

pub mod account_store_impl;
pub mod identity_repo_impl;
pub mod library_repo_impl;
pub mod settings_repo_impl;

pub use account_store_impl::PgAccountStore;
pub use identity_repo_impl::PgIdentityRepository;
pub use library_repo_impl::PgLibraryRepository;
pub use settings_repo_impl::PgSettingsRepository;
