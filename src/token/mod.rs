//! Bearer token issuance and validation.
//!
//! Tokens are compact HS256 JWTs. They carry no server-side state: a token is
//! valid exactly when its MAC checks out under the process signing key and its
//! `exp` has not passed.

mod error;
mod jwt;

pub use error::{KeyError, SigningError, TokenError};
pub use jwt::{TokenClaims, TokenHeader, sign_hs256, verify_hs256};

use secrecy::{ExposeSecret, SecretSlice};
use std::time::{Duration, SystemTime};
use tracing::instrument;

/// Lifetime of every issued token.
pub const TOKEN_VALIDITY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Shortest accepted HMAC key, matching the SHA-256 output size.
pub const MIN_KEY_LEN: usize = 32;

#[must_use]
pub fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// HMAC key material, fixed at startup.
pub struct SigningKey(SecretSlice<u8>);

impl SigningKey {
    /// # Errors
    ///
    /// Returns [`KeyError::TooShort`] if the key is shorter than [`MIN_KEY_LEN`].
    pub fn new(bytes: Vec<u8>) -> Result<Self, KeyError> {
        if bytes.len() < MIN_KEY_LEN {
            return Err(KeyError::TooShort {
                min: MIN_KEY_LEN,
                len: bytes.len(),
            });
        }
        Ok(Self(SecretSlice::from(bytes)))
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

#[derive(Debug)]
pub struct TokenService {
    key: SigningKey,
    validity_seconds: i64,
}

impl TokenService {
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self {
            key,
            validity_seconds: i64::try_from(TOKEN_VALIDITY.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token for `user_id` valid for [`TOKEN_VALIDITY`] from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::SigningFailure`] if the expiry overflows or
    /// signing fails. No token is produced in that case.
    #[instrument(skip(self))]
    pub fn issue(&self, user_id: &str, username: &str, now: i64) -> Result<String, SigningError> {
        let exp = now
            .checked_add(self.validity_seconds)
            .ok_or_else(|| SigningError::SigningFailure("expiry out of range".to_string()))?;

        let claims = TokenClaims {
            user_id: user_id.to_string(),
            username: username.to_string(),
            exp,
        };

        sign_hs256(self.key.0.expose_secret(), &claims)
    }

    /// Validate a presented token against the current time.
    ///
    /// # Errors
    ///
    /// See [`TokenService::validate_at`].
    pub fn validate(&self, presented: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(presented, now_unix_seconds())
    }

    /// Validate a presented token against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Malformed`], [`TokenError::BadSignature`] or
    /// [`TokenError::Expired`]. The subject is returned unchecked.
    pub fn validate_at(&self, presented: &str, now: i64) -> Result<TokenClaims, TokenError> {
        verify_hs256(presented, self.key.0.expose_secret(), now)
    }
}
