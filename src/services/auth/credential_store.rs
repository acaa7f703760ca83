use std::sync::Arc;

use tracing::{info, warn};

use crate::repos::user_repo::{Identity, NewIdentity, Role, UserStore};
use crate::services::auth::error::AuthError;
use crate::services::auth::password::PasswordHasher;

/// Registration and password verification over the identity storage.
///
/// Plaintext passwords only ever exist in memory for the duration of a call.
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Register a new USER identity.
    ///
    /// The existence checks give an early, cheap answer; the insert itself is the
    /// authority, so two racing registrations for one username cannot both win.
    pub async fn register(&self, username: &str, password: &str, email: &str) -> Result<Identity, AuthError> {
        if self.users.exists_by_username(username).await? {
            warn!(username, "registration rejected: username taken");
            return Err(AuthError::DuplicateUsername);
        }
        if self.users.exists_by_email(email).await? {
            warn!(username, "registration rejected: email taken");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash_blocking(password.to_string()).await?;

        let identity = self
            .users
            .insert(NewIdentity {
                username: username.to_string(),
                password_hash,
                email: email.to_string(),
                role: Role::User,
            })
            .await
            .map_err(|e| {
                let e = AuthError::from(e);
                if matches!(e, AuthError::DuplicateUsername | AuthError::DuplicateEmail) {
                    warn!(username, error = %e, "registration lost a uniqueness race");
                }
                e
            })?;

        info!(user_id = %identity.id, username = %identity.username, "identity registered");
        Ok(identity)
    }

    /// Check a username/password pair.
    ///
    /// Unknown user, wrong password and disabled account are indistinguishable
    /// to the caller, and all three pay for one Argon2 verification.
    pub async fn verify(&self, username: &str, plaintext: &str) -> Result<Identity, AuthError> {
        let found = self.users.find_by_username(username).await?;
        let stored = found.as_ref().map(|i| i.password_hash.clone());

        let matched = self.hasher.verify_blocking(plaintext.to_string(), stored).await;

        match found {
            Some(identity) if matched && identity.enabled => Ok(identity),
            _ => {
                warn!("login rejected: invalid credentials");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    pub async fn is_username_available(&self, username: &str) -> Result<bool, AuthError> {
        Ok(!self.users.exists_by_username(username).await?)
    }

    pub async fn is_email_available(&self, email: &str) -> Result<bool, AuthError> {
        Ok(!self.users.exists_by_email(email).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryUserRepo;
    use crate::services::auth::password::cheap_cost;

    fn store() -> (Arc<MemoryUserRepo>, CredentialStore) {
        let users = Arc::new(MemoryUserRepo::new());
        let hasher = PasswordHasher::new(cheap_cost()).unwrap();
        (users.clone(), CredentialStore::new(users, hasher))
    }

    #[tokio::test]
    async fn register_then_verify() {
        let (users, store) = store();

        let alice = store.register("alice", "Secret123!", "alice@x.com").await.unwrap();
        assert_eq!(alice.role, Role::User);
        assert!(alice.enabled);

        let stored = users.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "Secret123!");
        assert!(stored.password_hash.starts_with("$argon2id$"));

        let verified = store.verify("alice", "Secret123!").await.unwrap();
        assert_eq!(verified.id, alice.id);
    }

    #[tokio::test]
    async fn duplicate_username_and_email_are_rejected() {
        let (_, store) = store();
        store.register("alice", "Secret123!", "alice@x.com").await.unwrap();

        assert!(matches!(
            store.register("alice", "other-pw", "alice2@x.com").await,
            Err(AuthError::DuplicateUsername)
        ));
        assert!(matches!(
            store.register("alice2", "other-pw", "alice@x.com").await,
            Err(AuthError::DuplicateEmail)
        ));
    }

    #[tokio::test]
    async fn concurrent_registration_has_one_winner() {
        let (_, store) = store();

        let (a, b) = tokio::join!(
            store.register("bob", "pw-one-111", "bob1@x.com"),
            store.register("bob", "pw-two-222", "bob2@x.com"),
        );

        let results = [a, b];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(AuthError::DuplicateUsername)))
        );
    }

    #[tokio::test]
    async fn failures_are_uniform() {
        let (users, store) = store();
        store.register("alice", "Secret123!", "alice@x.com").await.unwrap();

        let wrong_pw = store.verify("alice", "wrong").await.unwrap_err();
        let unknown = store.verify("nobody", "Secret123!").await.unwrap_err();
        assert!(matches!(wrong_pw, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong_pw.to_string(), unknown.to_string());

        users.set_enabled("alice", false);
        assert!(matches!(
            store.verify("alice", "Secret123!").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn availability_checks() {
        let (_, store) = store();
        store.register("alice", "Secret123!", "alice@x.com").await.unwrap();

        assert!(!store.is_username_available("alice").await.unwrap());
        assert!(store.is_username_available("carol").await.unwrap());
        assert!(!store.is_email_available("alice@x.com").await.unwrap());
        assert!(store.is_email_available("carol@x.com").await.unwrap());
    }
}
