use thiserror::Error;

use crate::repos::error::RepoError;

/// Why a presented token was not accepted. Kept for diagnostics only; every
/// variant collapses to "unauthenticated" at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not verify")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token format or algorithm is not supported")]
    UnsupportedFormat,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username is already taken")]
    DuplicateUsername,
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("identity not found")]
    IdentityNotFound,
    #[error("insufficient authority")]
    InsufficientAuthority,
    #[error("password hashing failed")]
    Hashing,
    #[error("token signing failed")]
    Signing,
    #[error("identity storage failure")]
    Storage(#[source] RepoError),
}

impl From<RepoError> for AuthError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict("username") => AuthError::DuplicateUsername,
            RepoError::Conflict("email") => AuthError::DuplicateEmail,
            other => AuthError::Storage(other),
        }
    }
}

/// Startup-time failures while building the auth services from configuration.
#[derive(Debug, Error)]
pub enum AuthSetupError {
    #[error("signing key rejected: {0}")]
    WeakSigningKey(&'static str),
    #[error("invalid password hashing parameters: {0}")]
    HashParams(String),
    #[error("token ttl must be positive")]
    InvalidTtl,
}
