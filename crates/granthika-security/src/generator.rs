//! Random identifiers handed out at registration time.
//!
//! None of these check uniqueness; callers retry against their store.

use granthika_shared::constants::{LIBRARY_CODE_SUFFIX_LENGTH, MIN_PASSWORD_LENGTH};
use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PASSWORD_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const DIGITS: &[u8] = b"0123456789";

fn random_string(alphabet: &[u8], length: usize) -> String {
    // ThreadRng is a CSPRNG reseeded from the OS.
    let mut rng = rand::rng();
    (0..length)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

/// `DG-7K3Q` style code: prefix, dash, four uppercase alphanumerics.
pub fn generate_library_code(prefix: &str) -> String {
    format!("{}-{}", prefix, random_string(CODE_ALPHABET, LIBRARY_CODE_SUFFIX_LENGTH))
}

/// `DG582193` style username.
pub fn generate_username(prefix: &str, digits: usize) -> String {
    format!("{}{}", prefix, random_string(DIGITS, digits))
}

/// Letters and digits only; never shorter than eight characters.
pub fn generate_random_password(length: usize) -> String {
    random_string(PASSWORD_ALPHABET, length.max(MIN_PASSWORD_LENGTH))
}
