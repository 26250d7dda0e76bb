//! Argon2id password hashing and verification.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordVerifier, Version};

use keyward_core::error::AppError;

/// Argon2id hashing with a fresh random salt per password.
///
/// Hashes are stored in PHC string form, so verification reads the
/// algorithm and parameters from the hash itself.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }

    /// PHC-encoded hash of `password`.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        password_hash::PasswordHasher::hash_password(&self.argon2, password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// `Ok(false)` on mismatch; an error only when `hash` is not a PHC string.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Stored password hash is malformed: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!("Password verification failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(hasher.verify_password("secret1", &hash).unwrap());
        assert!(!hasher.verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_argon2id_phc() {
        let hash = PasswordHasher::new().hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_salted() {
        let hasher = PasswordHasher::new();
        assert_ne!(
            hasher.hash_password("same").unwrap(),
            hasher.hash_password("same").unwrap()
        );
    }

    #[test]
    fn test_malformed_hash_errors() {
        assert!(PasswordHasher::new().verify_password("x", "not-a-hash").is_err());
    }
}
