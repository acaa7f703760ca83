/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::repos::user_repo::UserStore;
use crate::services::auth::AuthService;
use crate::services::auth::credential_store::CredentialStore;
use crate::services::auth::error::AuthSetupError;
use crate::services::auth::identity_resolver::IdentityResolver;
use crate::services::auth::password::PasswordHasher;
use crate::services::auth::public_paths::PublicPaths;
use crate::services::auth::signing_key::SigningKey;
use crate::services::auth::token_issuer::TokenIssuer;
use crate::services::auth::token_validator::TokenValidator;

pub fn build_auth_service(
    config: &Config,
    users: Arc<dyn UserStore>,
) -> Result<Arc<AuthService>, AuthSetupError> {
    let key = SigningKey::from_secret(&config.jwt_secret)?;
    let hasher = PasswordHasher::new(config.password_hash_cost)?;

    let auth = AuthService::new(
        CredentialStore::new(users.clone(), hasher),
        TokenIssuer::new(key.clone(), config.jwt_expiration_seconds)?,
        TokenValidator::new(key),
        IdentityResolver::new(users),
        PublicPaths::new(config.public_path_prefixes.iter().cloned()),
    );

    Ok(Arc::new(auth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory::MemoryUserRepo;

    #[test]
    fn rejects_weak_secret() {
        let mut config = Config::for_tests();
        config.jwt_secret = "mySecretKey1234567890123456789012345678901234567890".to_string();

        let err = build_auth_service(&config, Arc::new(MemoryUserRepo::new())).unwrap_err();
        assert!(matches!(err, AuthSetupError::WeakSigningKey(_)));
    }

    #[tokio::test]
    async fn alice_scenario() {
        let auth = build_auth_service(&Config::for_tests(), Arc::new(MemoryUserRepo::new())).unwrap();

        let registered = auth.register("alice", "Secret123!", "alice@x.com").await.unwrap();
        let (issued, identity) = auth.login("alice", "Secret123!").await.unwrap();
        assert_eq!(identity.id, registered.id);

        let claims = auth.validator().validate(&issued.token).unwrap();
        assert_eq!(claims.sub, "alice");

        let principal = auth.authenticate(&issued.token).await.unwrap();
        assert_eq!(principal.user_id, registered.id);
        assert_eq!(principal.username, "alice");
    }

    #[tokio::test]
    async fn disabled_identity_token_does_not_authenticate() {
        let users = Arc::new(MemoryUserRepo::new());
        let auth = build_auth_service(&Config::for_tests(), users.clone()).unwrap();
        auth.register("alice", "Secret123!", "alice@x.com").await.unwrap();
        let (issued, _) = auth.login("alice", "Secret123!").await.unwrap();

        users.set_enabled("alice", false);
        assert!(matches!(
            auth.authenticate(&issued.token).await,
            Err(crate::services::auth::AuthError::IdentityNotFound)
        ));
    }
}
