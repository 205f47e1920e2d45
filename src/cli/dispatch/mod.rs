//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action the binary runs, currently only
//! starting the HTTP server.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::secrets;
use anyhow::Result;
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .map(|dsn| SecretString::from(dsn.clone()));

    let secrets = secrets::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        signing_key: secrets.signing_key,
        password_salt: secrets.password_salt,
        bcrypt_cost: secrets.bcrypt_cost,
    }))
}
