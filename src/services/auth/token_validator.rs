use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::Validation;
use jsonwebtoken::errors::ErrorKind;

use crate::services::auth::error::TokenError;
use crate::services::auth::signing_key::SigningKey;
use crate::services::auth::token_issuer::{Claims, TOKEN_ALGORITHM};

/// Verifies bearer tokens: signature first, then claims, then freshness.
///
/// Pure function of (token, key, now): no I/O and no shared mutable state, so a
/// single instance is shared by every request.
#[derive(Clone)]
pub struct TokenValidator {
    key: SigningKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenValidator")
            .field("validation", &self.validation)
            .finish()
    }
}

// Header and payload decode but the signature does not: a forged signature,
// not a malformed token.
fn signature_is_garbled(token: &str) -> bool {
    let mut segments = token.split('.');
    let (Some(header), Some(payload), Some(signature)) =
        (segments.next(), segments.next(), segments.next())
    else {
        return false;
    };
    URL_SAFE_NO_PAD.decode(header).is_ok()
        && URL_SAFE_NO_PAD.decode(payload).is_ok()
        && URL_SAFE_NO_PAD.decode(signature).is_err()
}

fn classify(e: &jsonwebtoken::errors::Error, token: &str) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName | ErrorKind::MissingAlgorithm => {
            TokenError::UnsupportedFormat
        }
        _ if signature_is_garbled(token) => TokenError::BadSignature,
        _ => TokenError::Malformed,
    }
}

impl TokenValidator {
    pub fn new(key: SigningKey) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked below against an explicit clock with no leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self { key, validation }
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Validate against an explicit `now` (unix seconds). A token is fresh while
    /// `exp > now`.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let segments: Vec<&str> = token.split('.').collect();
        match segments.len() {
            3 if segments[2].is_empty() => return Err(TokenError::UnsupportedFormat), // unsigned
            3 => {}
            5 => return Err(TokenError::UnsupportedFormat), // JWE compact form
            _ => return Err(TokenError::Malformed),
        }

        let data = jsonwebtoken::decode::<Claims>(token, self.key.decoding(), &self.validation)
            .map_err(|e| classify(&e, token))?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() || claims.iat > claims.exp {
            return Err(TokenError::Malformed);
        }
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
