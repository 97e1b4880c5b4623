//! Password hashing for panelist credentials
//!
//! Salted SHA-256, stored as 64 hex characters alongside the salt in
//! separate panelists columns. The guest row keeps both columns empty,
//! which can never match a computed hash.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of generated salts
const SALT_LEN: usize = 16;

/// Generate a random alphanumeric salt
pub fn generate_salt() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LEN)
        .map(char::from)
        .collect()
}

/// Hash a password with the given salt
///
/// Returns the SHA-256 of salt followed by password as 64 hex characters.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Check a password attempt against a stored hash and salt
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    hash_password(password, salt) == stored_hash
}
