//! # Tollgate (bearer-token authentication gateway)
//!
//! `tollgate` verifies salted password hashes at login and issues signed,
//! time-bounded bearer tokens that later requests present in the
//! `Authorization` header.
//!
//! ## Passwords
//!
//! Passwords are never stored or compared in plaintext. Registration stores
//! `bcrypt(password ++ salt)` where the salt is a single server-wide secret;
//! login re-runs the same scheme through [`password::PasswordVerifier`].
//!
//! ## Tokens
//!
//! Tokens are stateless HS256 JWTs carrying the user id, username and a fixed
//! seven day expiry (see [`token::TOKEN_VALIDITY`]). There is no server-side
//! session store, so a token stays valid until it expires.
//!
//! ## Gate
//!
//! [`gate::require_bearer`] rejects a request with `401 Unauthorized` and an
//! empty body before any protected handler runs. Missing scheme, empty token,
//! bad signature, expiry and malformed subject all look identical to the
//! caller; the distinction only shows up in the logs.

pub mod api;
pub mod cli;
pub mod gate;
pub mod password;
pub mod token;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
