//! Password hashing policy (Argon2id, tunable cost).
//!
//! - Hashes are self-describing PHC strings, so verification uses the cost the
//!   hash was created with even after the configured cost changes.
//! - Hashing is CPU-bound; callers on the async runtime go through
//!   `hash_blocking` / `verify_blocking`.
//! - `verify_dummy` burns the same work as a real check. Used when the username
//!   does not exist so both failure paths cost the same.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use tracing::error;

use crate::services::auth::error::{AuthError, AuthSetupError};

#[derive(Debug, Clone, Copy)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    // OWASP Argon2id baseline
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: String,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl PasswordHasher {
    pub fn new(cost: HashCost) -> Result<Self, AuthSetupError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| AuthSetupError::HashParams(e.to_string()))?;

        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };

        let mut filler = [0u8; 24];
        getrandom::fill(&mut filler).map_err(|e| AuthSetupError::HashParams(e.to_string()))?;
        hasher.dummy_hash = hasher
            .hash(&String::from_utf8_lossy(&filler))
            .map_err(|_| AuthSetupError::HashParams("failed to build dummy hash".to_string()))?;

        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::fill(&mut salt_bytes).map_err(|e| {
            error!(error = %e, "failed to gather salt entropy");
            AuthError::Hashing
        })?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
            error!(error = %e, "failed to encode salt");
            AuthError::Hashing
        })?;

        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| {
                error!(error = %e, "argon2 hashing failed");
                AuthError::Hashing
            })
    }

    /// `false` for a mismatch and for an unparseable stored hash alike.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            error!("stored password hash is not a valid PHC string");
            return false;
        };
        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy_hash);
    }

    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| {
                error!(error = %e, "password hashing task failed");
                AuthError::Hashing
            })?
    }

    /// `stored_hash = None` runs the dummy check and always yields `false`.
    pub async fn verify_blocking(&self, plaintext: String, stored_hash: Option<String>) -> bool {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match stored_hash {
            Some(h) => hasher.verify(&plaintext, &h),
            None => {
                hasher.verify_dummy(&plaintext);
                false
            }
        })
        .await
        .unwrap_or(false)
    }
}

#[cfg(test)]
pub(crate) fn cheap_cost() -> HashCost {
    HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifiable() {
        let hasher = PasswordHasher::new(cheap_cost()).unwrap();

        let a = hasher.hash("Secret123!").unwrap();
        let b = hasher.hash("Secret123!").unwrap();

        assert!(a.starts_with("$argon2id$"));
        assert!(!a.contains("Secret123!"));
        assert_ne!(a, b);
        assert!(hasher.verify("Secret123!", &a));
        assert!(hasher.verify("Secret123!", &b));
        assert!(!hasher.verify("secret123!", &a));
    }

    #[test]
    fn garbage_stored_hash_never_verifies() {
        let hasher = PasswordHasher::new(cheap_cost()).unwrap();
        assert!(!hasher.verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn rejects_invalid_cost() {
        let err = PasswordHasher::new(HashCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, AuthSetupError::HashParams(_)));
    }

    #[tokio::test]
    async fn blocking_helpers_match_sync_behavior() {
        let hasher = PasswordHasher::new(cheap_cost()).unwrap();
        let hash = hasher.hash_blocking("pw-123456".to_string()).await.unwrap();

        assert!(hasher.verify_blocking("pw-123456".to_string(), Some(hash.clone())).await);
        assert!(!hasher.verify_blocking("nope".to_string(), Some(hash)).await);
        assert!(!hasher.verify_blocking("pw-123456".to_string(), None).await);
    }
}
