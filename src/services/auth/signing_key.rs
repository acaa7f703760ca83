use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::services::auth::error::AuthSetupError;

/// HMAC keys shorter than this are refused (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

// Values that have shipped as samples/defaults somewhere and must never sign real tokens.
const KNOWN_PLACEHOLDERS: &[&str] = &[
    "mySecretKey1234567890123456789012345678901234567890",
    "changeme",
    "change-me",
    "secret",
    "your-256-bit-secret",
    "your-secret-key",
];

/// Process-wide symmetric signing key for HS512 tokens.
///
/// Loaded once at startup from configuration and shared read-only.
/// Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

impl SigningKey {
    pub fn from_secret(secret: &str) -> Result<Self, AuthSetupError> {
        let trimmed = secret.trim();

        if KNOWN_PLACEHOLDERS
            .iter()
            .any(|p| p.eq_ignore_ascii_case(trimmed))
        {
            return Err(AuthSetupError::WeakSigningKey("value is a known placeholder"));
        }
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthSetupError::WeakSigningKey("must be at least 32 bytes"));
        }
        if secret.bytes().all(|b| b == secret.as_bytes()[0]) {
            return Err(AuthSetupError::WeakSigningKey("must not repeat a single byte"));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}
