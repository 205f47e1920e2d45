use crate::{
    api::{self, SharedStore},
    cli::commands::secrets::KeySource,
    password::PasswordVerifier,
    token::{SigningKey, TokenService},
    users::{MemoryUserStore, PgUserStore},
};
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::{fs, sync::Arc};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<SecretString>,
    pub signing_key: KeySource,
    pub password_salt: SecretString,
    pub bcrypt_cost: u32,
}

/// Read the signing key once. File contents are used verbatim minus a
/// trailing newline.
///
/// # Errors
/// Returns an error if the key file cannot be read or the key is too short.
pub fn load_signing_key(source: &KeySource) -> Result<SigningKey> {
    let bytes = match source {
        KeySource::Inline(key) => key.expose_secret().as_bytes().to_vec(),
        KeySource::File(path) => {
            let mut bytes =
                fs::read(path).with_context(|| format!("Failed to read signing key: {path}"))?;
            while bytes.last().is_some_and(|b| *b == b'\n' || *b == b'\r') {
                bytes.pop();
            }
            bytes
        }
    };

    SigningKey::new(bytes).context("Invalid token signing key")
}

/// Execute the server action.
/// # Errors
/// Returns an error if the secrets are invalid, the database is unreachable,
/// or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let tokens = Arc::new(TokenService::new(load_signing_key(&args.signing_key)?));
    let verifier = Arc::new(PasswordVerifier::new(args.password_salt, args.bcrypt_cost));

    let store: SharedStore = if let Some(dsn) = &args.dsn {
        info!("Using Postgres user store");
        Arc::new(PgUserStore::connect(dsn.expose_secret()).await?)
    } else {
        warn!("No --dsn given, users are kept in memory");
        Arc::new(MemoryUserStore::new())
    };

    api::new(args.port, store, verifier, tokens).await
}
