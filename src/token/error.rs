use thiserror::Error;

/// Issue-time failure. Always a server fault, never the caller's.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("token signing failed: {0}")]
    SigningFailure(String),
}

/// Validation failures for a presented token.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token format")]
    Malformed,
    #[error("invalid signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid subject")]
    InvalidSubject,
}

/// Rejected signing key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing key must be at least {min} bytes, got {len}")]
    TooShort { min: usize, len: usize },
}
