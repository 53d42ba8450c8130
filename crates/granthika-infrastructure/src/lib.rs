//! # Granthika Infrastructure
//!
//! Adapters for the core ports: PostgreSQL repositories with embedded
//! migrations, an in-memory store, and SMTP email delivery.

pub mod database;
pub mod email;
pub mod memory;

pub use database::{
    create_pool, run_migrations, PgAccountStore, PgIdentityRepository, PgLibraryRepository,
    PgSettingsRepository,
};
pub use email::{DisabledMailDispatcher, EmailError, SmtpMailDispatcher, TemplateEngine};
pub use memory::MemoryStore;
