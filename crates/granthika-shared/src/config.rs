//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_CODE_PREFIX, DEFAULT_GENERATION_ATTEMPTS, DEFAULT_SESSION_EXPIRY,
    DEFAULT_USERNAME_DIGITS, DEFAULT_USERNAME_PREFIX, REMEMBER_ME_EXPIRY,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub email: EmailSettings,
    pub registration: RegistrationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    /// `postgres://...` or `memory://` for the in-process store.
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

impl DatabaseSettings {
    pub fn is_memory(&self) -> bool {
        self.url.starts_with("memory://")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    /// Seconds a session token lives without "remember me".
    pub session_expiry: i64,
    pub remember_me_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// One of `none`, `starttls`, `tls`.
    pub tls_mode: String,
    pub timeout_seconds: u64,
    pub from_address: String,
    pub from_name: String,
    pub brand_name: String,
    pub sign_in_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RegistrationSettings {
    pub code_prefix: String,
    pub username_prefix: String,
    pub username_digits: usize,
    pub max_generation_attempts: u32,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            code_prefix: DEFAULT_CODE_PREFIX.to_string(),
            username_prefix: DEFAULT_USERNAME_PREFIX.to_string(),
            username_digits: DEFAULT_USERNAME_DIGITS,
            max_generation_attempts: DEFAULT_GENERATION_ATTEMPTS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub directory: Option<String>,
    pub file_prefix: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "granthika-server")?
            .set_default("app.request_timeout_seconds", 30)?
            .set_default("database.url", "memory://")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.run_migrations", true)?
            .set_default("jwt.session_expiry", DEFAULT_SESSION_EXPIRY)?
            .set_default("jwt.remember_me_expiry", REMEMBER_ME_EXPIRY)?
            .set_default("email.enabled", false)?
            .set_default("email.smtp_host", "localhost")?
            .set_default("email.smtp_port", 587)?
            .set_default("email.smtp_username", "")?
            .set_default("email.smtp_password", "")?
            .set_default("email.tls_mode", "starttls")?
            .set_default("email.timeout_seconds", 10)?
            .set_default("email.from_address", "no-reply@granthika.local")?
            .set_default("email.from_name", "Dooars Granthika")?
            .set_default("email.brand_name", "Dooars Granthika")?
            .set_default("email.sign_in_url", "http://127.0.0.1:8080/accounts/sign_in")?
            .set_default("registration.code_prefix", DEFAULT_CODE_PREFIX)?
            .set_default("registration.username_prefix", DEFAULT_USERNAME_PREFIX)?
            .set_default("registration.username_digits", DEFAULT_USERNAME_DIGITS as i64)?
            .set_default("registration.max_generation_attempts", DEFAULT_GENERATION_ATTEMPTS)?
            .set_default("logging.level", "info")?
            .set_default("logging.file_prefix", "granthika.log")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))
            .build()?;
        config.try_deserialize()
    }
}
