use crate::{
    api,
    auth::{AuthService, BcryptVerifier, JwtSigner, PgUserStore, password::hash_password},
};
use anyhow::{Context, Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub token_ttl: Duration,
    pub auth_timeout: Duration,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the signing secret is unusable, the database cannot be
/// reached, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    info!(
        port = args.port,
        dsn = %redact_dsn(&args.dsn),
        token_ttl_seconds = args.token_ttl.as_secs(),
        auth_timeout_seconds = args.auth_timeout.as_secs(),
        "Startup configuration"
    );

    // fail before touching the network if the secret is blank
    let signer = JwtSigner::new(&args.jwt_secret).context("invalid --jwt-secret")?;

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&args.dsn)
        .await
        .context("Failed to connect to database")?;

    let service = AuthService::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(BcryptVerifier),
        Arc::new(signer),
    )
    .with_token_ttl(args.token_ttl)
    .with_timeout(args.auth_timeout);

    api::new(args.port, Arc::new(service), pool).await
}

#[derive(Debug)]
pub struct HashArgs {
    pub password: SecretString,
}

/// Print a `bcrypt` hash of the password.
/// # Errors
/// Returns an error if the password is empty or hashing fails.
pub fn hash(args: &HashArgs) -> Result<()> {
    println!("{}", hashed(&args.password)?);

    Ok(())
}

fn hashed(password: &SecretString) -> Result<String> {
    let password = password.expose_secret();
    if password.is_empty() {
        return Err(anyhow!("password must not be empty"));
    }

    hash_password(password).context("Failed to hash password")
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}
