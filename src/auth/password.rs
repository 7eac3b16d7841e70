//! Salted, adaptive password hashing (`Argon2id`).
//!
//! Hashes are stored in PHC string format, so the salt and cost parameters
//! travel with the hash and verification never needs extra configuration.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier as _, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    Params(String),
    #[error("failed to hash password")]
    Hash,
}

/// `Argon2id` cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// Hashes and verifies passwords with a fixed work factor.
#[derive(Clone, Debug)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Build a hasher for the given cost.
    ///
    /// # Errors
    /// Returns an error if argon2 rejects the parameters.
    pub fn new(cost: HashCost) -> Result<Self, PasswordError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|err| PasswordError::Params(err.to_string()))?;
        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        // Burned on unknown-email logins so both failure branches cost the same.
        hasher.dummy_hash = hasher.hash(&ulid::Ulid::new().to_string())?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// Returns an error if hashing fails.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| PasswordError::Hash)
    }

    /// Check a plaintext password against a stored PHC hash.
    ///
    /// A malformed stored hash verifies as `false`. The comparison itself is
    /// constant time.
    #[must_use]
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            return false;
        };
        // Cost parameters come from the stored hash, not from `self.params`.
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    /// Pay the verification cost without a real hash to compare against.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy_hash);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::new(HashCost {
            memory_kib: 256,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn verify_accepts_the_original_password() {
        let hasher = cheap_hasher();
        let hash = hasher.hash("secret").unwrap();
        assert!(hasher.verify("secret", &hash));
        assert!(!hasher.verify("secret2", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn hash_uses_a_fresh_salt_each_time() {
        let hasher = cheap_hasher();
        let first = hasher.hash("secret").unwrap();
        let second = hasher.hash("secret").unwrap();
        assert_ne!(first, second);
        assert_ne!(first, "secret");
        assert!(first.starts_with("$argon2id$"));
    }

    #[test]
    fn malformed_hash_verifies_false() {
        let hasher = cheap_hasher();
        assert!(!hasher.verify("secret", ""));
        assert!(!hasher.verify("secret", "secret"));
        assert!(!hasher.verify("secret", "$argon2id$v=19$garbage"));
    }

    #[test]
    fn verify_honors_cost_embedded_in_hash() {
        let weak = cheap_hasher();
        let stronger = PasswordHasher::new(HashCost {
            memory_kib: 512,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = weak.hash("secret").unwrap();
        assert!(stronger.verify("secret", &hash));
    }

    #[test]
    fn invalid_cost_is_rejected() {
        let result = PasswordHasher::new(HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(result, Err(PasswordError::Params(_))));
    }
}
