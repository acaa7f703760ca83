use std::sync::Arc;

use uuid::Uuid;

use crate::repos::user_repo::{Identity, UserStore};
use crate::services::auth::error::AuthError;

/// Maps a verified token subject back to the live identity record.
///
/// A token only proves it was issued correctly at some point; the identity may
/// have been disabled since. Disabled identities resolve as not found.
#[derive(Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver").finish_non_exhaustive()
    }
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn resolve(&self, subject: &str) -> Result<Identity, AuthError> {
        match self.users.find_by_username(subject).await? {
            Some(identity) if identity.enabled => Ok(identity),
            _ => Err(AuthError::IdentityNotFound),
        }
    }

    /// Administrative lookup. Disabled identities are still returned here.
    pub async fn by_id(&self, id: Uuid) -> Result<Identity, AuthError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AuthError::IdentityNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryUserRepo;
    use crate::repos::user_repo::{NewIdentity, Role};

    async fn seeded() -> (Arc<MemoryUserRepo>, IdentityResolver, Identity) {
        let users = Arc::new(MemoryUserRepo::new());
        let alice = users
            .insert(NewIdentity {
                username: "alice".to_string(),
                password_hash: "$argon2id$stub".to_string(),
                email: "alice@x.com".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();
        let resolver = IdentityResolver::new(users.clone());
        (users, resolver, alice)
    }

    #[tokio::test]
    async fn resolves_live_identity() {
        let (_, resolver, alice) = seeded().await;
        let found = resolver.resolve("alice").await.unwrap();
        assert_eq!(found.id, alice.id);
    }

    #[tokio::test]
    async fn subject_lookup_is_case_sensitive() {
        let (_, resolver, _) = seeded().await;
        assert!(matches!(
            resolver.resolve("Alice").await,
            Err(AuthError::IdentityNotFound)
        ));
    }

    #[tokio::test]
    async fn disabled_identity_is_not_found() {
        let (users, resolver, alice) = seeded().await;
        users.set_enabled("alice", false);

        assert!(matches!(
            resolver.resolve("alice").await,
            Err(AuthError::IdentityNotFound)
        ));
        assert_eq!(resolver.by_id(alice.id).await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let (_, resolver, _) = seeded().await;
        assert!(matches!(
            resolver.by_id(Uuid::new_v4()).await,
            Err(AuthError::IdentityNotFound)
        ));
    }
}
