//! Password hashing and verification.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Hashing failed: {0}")]
    Hash(String),
    #[error("Malformed password digest: {0}")]
    MalformedDigest(String),
    #[error("Invalid hash parameters: {0}")]
    Params(String),
}

/// Hashes and verifies tutor passwords (argon2id, per-password random salt).
///
/// The work factor is configuration, not code: raising it only affects
/// newly stored digests, old ones keep verifying with the parameters baked
/// into their PHC string.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Build a hasher with the given work factor.
    pub fn new(memory_kib: u32, time_cost: u32) -> Result<Self, CredentialError> {
        let params = Params::new(memory_kib, time_cost, Params::DEFAULT_P_COST, None)
            .map_err(|e| CredentialError::Params(e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext secret with a fresh random salt.
    pub fn hash(&self, secret: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hash(e.to_string()))?;
        Ok(digest.to_string())
    }

    /// Check a plaintext secret against a stored digest.
    ///
    /// A mismatch is `Ok(false)`; only a malformed digest is an error.
    pub fn verify(&self, secret: &str, digest: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| CredentialError::MalformedDigest(e.to_string()))?;
        match self.argon2.verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::MalformedDigest(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        // Minimal work factor to keep the tests fast
        CredentialHasher::new(Params::MIN_M_COST, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let digest = hasher.hash("correct horse battery staple").unwrap();

        assert!(hasher.verify("correct horse battery staple", &digest).unwrap());
        assert!(!hasher.verify("wrong password", &digest).unwrap());
    }

    #[test]
    fn test_hashing_is_salted() {
        let hasher = hasher();
        let d1 = hasher.hash("password123").unwrap();
        let d2 = hasher.hash("password123").unwrap();
        assert_ne!(d1, d2);
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        let hasher = hasher();
        assert!(hasher.verify("anything", "not-a-phc-string").is_err());
    }
}
