//! Application-wide constants

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Length of the random part of a library code (`DG-7K3Q`).
pub const LIBRARY_CODE_SUFFIX_LENGTH: usize = 4;
pub const DEFAULT_CODE_PREFIX: &str = "DG";
pub const DEFAULT_USERNAME_PREFIX: &str = "DG";
pub const DEFAULT_USERNAME_DIGITS: usize = 6;
pub const DEFAULT_GENERATION_ATTEMPTS: u32 = 20;
pub const DEFAULT_RESET_PASSWORD_LENGTH: usize = 10;

pub const DEFAULT_TRIAL_DAYS: i64 = 30;
pub const DEFAULT_SESSION_EXPIRY: i64 = 43_200;
pub const REMEMBER_ME_EXPIRY: i64 = 604_800;

pub const SESSION_COOKIE_NAME: &str = "granthika_session";
pub const TOGGLE_ON: &str = "on";
