//! One-way salted hashing of user secrets.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand_core::OsRng;
use thiserror::Error;

use fineease_core::{DomainError, DomainResult};

use crate::CredentialHash;

/// The hasher itself failed; says nothing about the secret.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("secret could not be hashed: {0}")]
pub struct HashingError(pub String);

/// Salted one-way hash and its verifier. Opaque to the rest of the crate.
///
/// Both calls are CPU-bound; the verifier runs them on the blocking pool.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, secret: &str) -> Result<CredentialHash, HashingError>;

    /// `false` for a wrong secret and for an unparseable stored hash alike.
    fn verify(&self, secret: &str, hash: &CredentialHash) -> bool;
}

/// Argon2id hasher producing PHC strings (salt and parameters embedded).
#[derive(Debug, Clone, Default)]
pub struct Argon2SecretHasher {
    argon2: Argon2<'static>,
}

impl Argon2SecretHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argon2id with explicit memory (KiB) and iteration cost, single lane.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> DomainResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| DomainError::validation(format!("argon2 params: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl SecretHasher for Argon2SecretHasher {
    fn hash(&self, secret: &str) -> Result<CredentialHash, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| HashingError(e.to_string()))?;
        Ok(CredentialHash::from_phc(phc.to_string()))
    }

    fn verify(&self, secret: &str, hash: &CredentialHash) -> bool {
        let Ok(parsed) = PasswordHash::new(hash.as_phc()) else {
            return false;
        };
        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2SecretHasher {
        Argon2SecretHasher::with_cost(1024, 1).unwrap()
    }

    #[test]
    fn verifies_the_original_secret_only() {
        let h = hasher();
        let hash = h.hash("correct horse").unwrap();
        assert!(h.verify("correct horse", &hash));
        assert!(!h.verify("battery staple", &hash));
    }

    #[test]
    fn hash_never_contains_the_secret_and_is_salted() {
        let h = hasher();
        let a = h.hash("hunter22").unwrap();
        let b = h.hash("hunter22").unwrap();
        assert!(!a.as_phc().contains("hunter22"));
        assert_ne!(a, b);
        assert!(a.as_phc().starts_with("$argon2id$"));
    }

    #[test]
    fn garbage_hash_does_not_verify() {
        assert!(!hasher().verify("x", &CredentialHash::from_phc("not-a-phc-string")));
    }
}
