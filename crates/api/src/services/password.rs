//! Password hashing with Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Hashing and verification behind a trait so tests can substitute a cheap
/// implementation; Argon2 at default cost is deliberately slow.
pub trait CredentialStore: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// Constant-time verification. A stored hash that fails to parse counts
    /// as a mismatch rather than an error, so login cannot leak which
    /// accounts have malformed credentials.
    fn verify(&self, password: &str, hashed: &str) -> bool;
}

#[derive(Debug, Default, Clone)]
pub struct Argon2Credentials;

impl CredentialStore for Argon2Credentials {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(CredentialError::Hash)
    }

    fn verify(&self, password: &str, hashed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
