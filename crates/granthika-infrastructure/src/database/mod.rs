//! Database module (PostgreSQL adapters)

pub mod connection;
pub mod constraints;
pub mod postgres;

pub use connection::{create_pool, run_migrations};
pub use postgres::{PgAccountStore, PgIdentityRepository, PgLibraryRepository, PgSettingsRepository};
