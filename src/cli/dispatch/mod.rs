use crate::cli::{
    actions::{Action, server, session},
    commands::{
        server::{
            ARG_AUTH_TIMEOUT, ARG_DSN, ARG_JWT_SECRET, ARG_PORT, ARG_TOKEN_TTL, CMD_HASH_PASSWORD,
            CMD_SERVER,
        },
        session::{
            ARG_EMAIL, ARG_ENDPOINT, ARG_PASSWORD, ARG_SESSION_FILE, CMD_LOGIN, CMD_LOGOUT,
            CMD_STATUS,
        },
    },
};
use anyhow::{Context, Result, anyhow};
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

/// Default session location under the user's config directory.
///
/// # Errors
/// Returns an error if the platform has no config directory.
pub fn default_session_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("session.json"))
        .context("could not determine a config directory, use --session-file")
}

fn session_args(matches: &clap::ArgMatches) -> Result<session::Args> {
    let endpoint = matches
        .get_one::<String>(ARG_ENDPOINT)
        .cloned()
        .context("missing required argument: --endpoint")?;

    let session_file = match matches.get_one::<String>(ARG_SESSION_FILE) {
        Some(path) => PathBuf::from(path),
        None => default_session_file()?,
    };

    Ok(session::Args {
        endpoint,
        session_file,
    })
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((CMD_SERVER, sub_m)) => {
            let port = sub_m.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
            let dsn = sub_m
                .get_one::<String>(ARG_DSN)
                .cloned()
                .context("missing required argument: --dsn")?;
            let jwt_secret = sub_m
                .get_one::<String>(ARG_JWT_SECRET)
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --jwt-secret")?;
            let token_ttl = sub_m.get_one::<u64>(ARG_TOKEN_TTL).copied().unwrap_or(86_400);
            let auth_timeout = sub_m.get_one::<u64>(ARG_AUTH_TIMEOUT).copied().unwrap_or(10);

            Ok(Action::Server(server::Args {
                port,
                dsn,
                jwt_secret,
                token_ttl: Duration::from_secs(token_ttl),
                auth_timeout: Duration::from_secs(auth_timeout),
            }))
        }
        Some((CMD_HASH_PASSWORD, sub_m)) => {
            let password = sub_m
                .get_one::<String>(crate::cli::commands::server::ARG_PASSWORD)
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password")?;

            Ok(Action::HashPassword(server::HashArgs { password }))
        }
        Some((CMD_LOGIN, sub_m)) => {
            let email = sub_m
                .get_one::<String>(ARG_EMAIL)
                .cloned()
                .context("missing required argument: --email")?;
            let password = sub_m
                .get_one::<String>(ARG_PASSWORD)
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password")?;

            Ok(Action::Login(session::LoginArgs {
                session: session_args(sub_m)?,
                email,
                password,
            }))
        }
        Some((CMD_LOGOUT, sub_m)) => Ok(Action::Logout(session_args(sub_m)?)),
        Some((CMD_STATUS, sub_m)) => Ok(Action::Status(session_args(sub_m)?)),
        Some((name, _)) => Err(anyhow!("unknown command: {name}")),
        None => Err(anyhow!("missing command")),
    }
}
