//! # Granthika Security
//!
//! Password hashing, session tokens and the random generators used for
//! library codes, bootstrap usernames and reset passwords.

pub mod generator;
pub mod jwt;
pub mod password;

pub use generator::{generate_library_code, generate_random_password, generate_username};
pub use jwt::{Claims, JwtError, JwtService};
pub use password::{PasswordError, PasswordService};
