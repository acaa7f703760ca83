pub mod credential_store;
pub mod error;
pub mod factory;
pub mod identity_resolver;
pub mod password;
pub mod policy;
pub mod principal;
pub mod public_paths;
pub mod signing_key;
pub mod token_issuer;
pub mod token_validator;

pub use error::AuthError;
pub use factory::build_auth_service;
pub use principal::AuthenticatedPrincipal;

use uuid::Uuid;

use crate::repos::user_repo::Identity;
use credential_store::CredentialStore;
use identity_resolver::IdentityResolver;
use public_paths::PublicPaths;
use token_issuer::{IssuedToken, TokenIssuer};
use token_validator::TokenValidator;

/// Authentication core shared by every request.
///
/// - Everything here is immutable after startup; no locks on the request path.
/// - Key material is not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    credentials: CredentialStore,
    issuer: TokenIssuer,
    validator: TokenValidator,
    resolver: IdentityResolver,
    public_paths: PublicPaths,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("ttl_seconds", &self.issuer.ttl_seconds())
            .field("public_paths", &self.public_paths)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        credentials: CredentialStore,
        issuer: TokenIssuer,
        validator: TokenValidator,
        resolver: IdentityResolver,
        public_paths: PublicPaths,
    ) -> Self {
        Self {
            credentials,
            issuer,
            validator,
            resolver,
            public_paths,
        }
    }

    pub async fn register(&self, username: &str, password: &str, email: &str) -> Result<Identity, AuthError> {
        self.credentials.register(username, password, email).await
    }

    /// Verify credentials and mint a bearer token for the identity.
    pub async fn login(&self, username: &str, password: &str) -> Result<(IssuedToken, Identity), AuthError> {
        let identity = self.credentials.verify(username, password).await?;
        let issued = self.issuer.issue(&identity)?;
        Ok((issued, identity))
    }

    /// Token -> principal: signature and freshness first, then the live identity.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedPrincipal, AuthError> {
        let claims = self.validator.validate(token)?;
        let identity = self.resolver.resolve(&claims.sub).await?;
        Ok(AuthenticatedPrincipal::from_identity(&identity))
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.is_public(path)
    }

    pub async fn identity_by_id(&self, id: Uuid) -> Result<Identity, AuthError> {
        self.resolver.by_id(id).await
    }

    pub async fn is_username_available(&self, username: &str) -> Result<bool, AuthError> {
        self.credentials.is_username_available(username).await
    }

    pub async fn is_email_available(&self, email: &str) -> Result<bool, AuthError> {
        self.credentials.is_email_available(email).await
    }

    #[cfg(test)]
    pub fn token_ttl_seconds(&self) -> u64 {
        self.issuer.ttl_seconds()
    }

    #[cfg(test)]
    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    #[cfg(test)]
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }
}
