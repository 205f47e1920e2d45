//! Salted bcrypt password hashing and verification.
//!
//! Every password is suffixed with one server-wide salt before it reaches
//! bcrypt. bcrypt still embeds its own per-hash salt and cost in the stored
//! string, so verification always re-reads those parameters from the hash.
//!
//! bcrypt only reads the first [`MAX_INPUT_LEN`] bytes of its input, so
//! longer `password ++ salt` inputs are refused rather than truncated.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Lowest bcrypt cost accepted by the `bcrypt` crate.
pub const MIN_COST: u32 = 4;

/// Highest bcrypt cost accepted by the `bcrypt` crate.
pub const MAX_COST: u32 = 31;

pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

/// Longest `password ++ salt` bcrypt reads in full.
pub const MAX_INPUT_LEN: usize = 72;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerificationError {
    #[error("given password(s) is empty")]
    EmptyInput,
    #[error("password mismatch or malformed hash")]
    MismatchOrMalformed,
    #[error("password and salt exceed {MAX_INPUT_LEN} bytes")]
    TooLong,
    #[error("failed to hash password")]
    Hashing,
}

#[derive(Clone)]
pub struct PasswordVerifier {
    salt: SecretString,
    cost: u32,
}

impl PasswordVerifier {
    #[must_use]
    pub fn new(salt: SecretString, cost: u32) -> Self {
        Self { salt, cost }
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Longest password this verifier can hash without truncation.
    #[must_use]
    pub fn max_password_len(&self) -> usize {
        MAX_INPUT_LEN.saturating_sub(self.salt.expose_secret().len())
    }

    fn salted(&self, password: &str) -> Result<SecretString, VerificationError> {
        if password.len() > self.max_password_len() {
            return Err(VerificationError::TooLong);
        }

        let mut buf = String::with_capacity(password.len() + self.salt.expose_secret().len());
        buf.push_str(password);
        buf.push_str(self.salt.expose_secret());
        Ok(SecretString::from(buf))
    }

    /// Check `supplied` against a stored bcrypt hash.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::EmptyInput`] if either argument is empty and
    /// [`VerificationError::MismatchOrMalformed`] for a wrong password or a hash
    /// bcrypt cannot parse. A password too long to have been hashed is a
    /// mismatch as well. Callers must not tell these apart to the client.
    pub fn verify(&self, stored_hash: &str, supplied: &str) -> Result<(), VerificationError> {
        if stored_hash.is_empty() || supplied.is_empty() {
            return Err(VerificationError::EmptyInput);
        }

        let salted = self
            .salted(supplied)
            .map_err(|_| VerificationError::MismatchOrMalformed)?;
        match bcrypt::verify(salted.expose_secret(), stored_hash) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(VerificationError::MismatchOrMalformed),
        }
    }

    /// Produce the hash stored at registration time.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError::EmptyInput`] for an empty password,
    /// [`VerificationError::TooLong`] when `password ++ salt` exceeds
    /// [`MAX_INPUT_LEN`] and [`VerificationError::Hashing`] if bcrypt rejects
    /// the configured cost.
    pub fn hash(&self, password: &str) -> Result<String, VerificationError> {
        if password.is_empty() {
            return Err(VerificationError::EmptyInput);
        }

        let salted = self.salted(password)?;
        bcrypt::hash(salted.expose_secret(), self.cost).map_err(|_| VerificationError::Hashing)
    }

    /// Spend one bcrypt round for a username that does not exist, so the
    /// response takes as long as a real mismatch. Always fails.
    ///
    /// # Errors
    ///
    /// Always returns [`VerificationError::MismatchOrMalformed`].
    pub fn verify_unknown(&self, supplied: &str) -> Result<(), VerificationError> {
        let mut buf = String::with_capacity(MAX_INPUT_LEN);
        for c in supplied.chars() {
            if buf.len() + c.len_utf8() > self.max_password_len() {
                break;
            }
            buf.push(c);
        }
        let salted = self.salted(&buf)?;
        let _ = bcrypt::hash(salted.expose_secret(), self.cost);
        Err(VerificationError::MismatchOrMalformed)
    }
}

impl std::fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordVerifier")
            .field("salt", &"***")
            .field("cost", &self.cost)
            .finish()
    }
}
