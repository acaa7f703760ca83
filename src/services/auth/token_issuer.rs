use chrono::Utc;
use jsonwebtoken::{Algorithm, Header};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::repos::user_repo::Identity;
use crate::services::auth::error::{AuthError, AuthSetupError};
use crate::services::auth::signing_key::SigningKey;

pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS512;

/// Bearer token claims. Timestamps are unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted token plus what a login response needs to describe it.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
    pub claims: Claims,
}

/// Mints HS512-signed, time-bounded bearer tokens.
///
/// No server-side record is created; the token is self-contained.
#[derive(Clone, Debug)]
pub struct TokenIssuer {
    key: SigningKey,
    ttl_seconds: u64,
}

impl TokenIssuer {
    pub fn new(key: SigningKey, ttl_seconds: u64) -> Result<Self, AuthSetupError> {
        if ttl_seconds == 0 || ttl_seconds > i64::MAX as u64 {
            return Err(AuthSetupError::InvalidTtl);
        }
        Ok(Self { key, ttl_seconds })
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, AuthError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Issue with an explicit `now` (unix seconds).
    pub fn issue_at(&self, identity: &Identity, now: i64) -> Result<IssuedToken, AuthError> {
        let claims = Claims {
            sub: identity.username.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_seconds as i64),
        };

        let mut header = Header::new(TOKEN_ALGORITHM);
        header.typ = Some("JWT".to_string());

        let token = jsonwebtoken::encode(&header, &claims, self.key.encoding()).map_err(|e| {
            error!(error = %e, "failed to sign token");
            AuthError::Signing
        })?;

        debug!(user_id = %identity.id, exp = claims.exp, "issued bearer token");

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_seconds,
            claims,
        })
    }
}
