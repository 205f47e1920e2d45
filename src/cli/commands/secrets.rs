use crate::password::{DEFAULT_COST, MAX_COST, MAX_INPUT_LEN, MIN_COST};
use anyhow::{Result, anyhow};
use clap::{Arg, ArgMatches, Command};
use secrecy::{ExposeSecret, SecretString};

pub const ARG_SIGNING_KEY: &str = "signing-key";
pub const ARG_SIGNING_KEY_PATH: &str = "signing-key-path";
pub const ARG_PASSWORD_SALT: &str = "password-salt";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SIGNING_KEY)
                .long(ARG_SIGNING_KEY)
                .help("HMAC key used to sign bearer tokens (at least 32 bytes)")
                .env("TOLLGATE_SIGNING_KEY")
                .hide_env_values(true)
                .conflicts_with(ARG_SIGNING_KEY_PATH),
        )
        .arg(
            Arg::new(ARG_SIGNING_KEY_PATH)
                .long(ARG_SIGNING_KEY_PATH)
                .help("Path to a file holding the token signing key")
                .env("TOLLGATE_SIGNING_KEY_PATH"),
        )
        .arg(
            Arg::new(ARG_PASSWORD_SALT)
                .long(ARG_PASSWORD_SALT)
                .help("Server-wide salt appended to every password before hashing")
                .env("TOLLGATE_PASSWORD_SALT")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long(ARG_BCRYPT_COST)
                .help("bcrypt cost factor for newly registered passwords")
                .env("TOLLGATE_BCRYPT_COST")
                .default_value("12")
                .value_parser(
                    clap::value_parser!(u32).range(i64::from(MIN_COST)..=i64::from(MAX_COST)),
                ),
        )
}

/// Where the signing key comes from.
#[derive(Debug)]
pub enum KeySource {
    Inline(SecretString),
    File(String),
}

#[derive(Debug)]
pub struct Options {
    pub signing_key: KeySource,
    pub password_salt: SecretString,
    pub bcrypt_cost: u32,
}

impl Options {
    /// # Errors
    /// Returns an error if no signing key is configured, or the salt is empty
    /// or leaves no room for a password within bcrypt's input limit.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let signing_key = if let Some(key) = matches.get_one::<String>(ARG_SIGNING_KEY) {
            KeySource::Inline(SecretString::from(key.clone()))
        } else if let Some(path) = matches.get_one::<String>(ARG_SIGNING_KEY_PATH) {
            KeySource::File(path.clone())
        } else {
            return Err(anyhow!(
                "missing required argument: --{ARG_SIGNING_KEY} or --{ARG_SIGNING_KEY_PATH}"
            ));
        };

        let password_salt = matches
            .get_one::<String>(ARG_PASSWORD_SALT)
            .map(|s| SecretString::from(s.clone()))
            .ok_or_else(|| anyhow!("missing required argument: --{ARG_PASSWORD_SALT}"))?;

        if password_salt.expose_secret().is_empty() {
            return Err(anyhow!("--{ARG_PASSWORD_SALT} must not be empty"));
        }

        if password_salt.expose_secret().len() >= MAX_INPUT_LEN {
            return Err(anyhow!(
                "--{ARG_PASSWORD_SALT} must be shorter than {MAX_INPUT_LEN} bytes"
            ));
        }

        let bcrypt_cost = matches
            .get_one::<u32>(ARG_BCRYPT_COST)
            .copied()
            .unwrap_or(DEFAULT_COST);

        Ok(Self {
            signing_key,
            password_salt,
            bcrypt_cost,
        })
    }
}
