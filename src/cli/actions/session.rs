use crate::{
    auth::SessionProfile,
    session::{
        Access, Dashboard, FileStorage, HttpAuthClient, LoginForm, SessionManager, protected,
        public_only,
    },
};
use anyhow::{Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use std::{path::PathBuf, sync::Arc};
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub endpoint: String,
    pub session_file: PathBuf,
}

#[derive(Debug)]
pub struct LoginArgs {
    pub session: Args,
    pub email: String,
    pub password: SecretString,
}

fn manager(args: &Args) -> Result<SessionManager> {
    debug!("Session file: {}", args.session_file.display());

    let client = HttpAuthClient::new(&args.endpoint)?;
    let storage = FileStorage::new(&args.session_file);

    Ok(SessionManager::start(Arc::new(client), Arc::new(storage)))
}

/// Signs in unless a valid session already exists.
///
/// # Errors
/// Returns an error if the form is invalid or authentication fails.
pub async fn sign_in(manager: &mut SessionManager, form: &LoginForm) -> Result<SessionProfile> {
    manager.enforce_expiry();

    if let (Access::Redirect(_), Some(profile)) = (public_only(&manager.state()), manager.profile())
    {
        debug!("Session already active, skipping login");

        return Ok(profile);
    }

    let credentials = form.validate().map_err(|errors| {
        let messages: Vec<&str> = [errors.email, errors.password].into_iter().flatten().collect();
        anyhow!(messages.join(", "))
    })?;

    Ok(manager
        .login(&credentials.email, &credentials.password)
        .await?)
}

/// Renders the dashboard for an authenticated session, or the hint to log in.
#[must_use]
pub fn describe(manager: &mut SessionManager) -> String {
    manager.enforce_expiry();

    match (protected(&manager.state()), manager.profile()) {
        (Access::Render, Some(profile)) => Dashboard::from_profile(&profile).to_string(),
        _ => format!("Not signed in. Run `{} login`.", env!("CARGO_PKG_NAME")),
    }
}

/// # Errors
/// Returns an error if the session cannot be established.
pub async fn login(args: LoginArgs) -> Result<()> {
    let mut manager = manager(&args.session)?;
    let form = LoginForm::new(args.email, args.password.expose_secret());

    sign_in(&mut manager, &form).await?;

    println!("{}", describe(&mut manager));

    Ok(())
}

/// # Errors
/// Returns an error if the HTTP client cannot be configured.
pub fn logout(args: &Args) -> Result<()> {
    let mut manager = manager(args)?;
    manager.logout();

    println!("Signed out.");

    Ok(())
}

/// # Errors
/// Returns an error if the HTTP client cannot be configured.
pub fn status(args: &Args) -> Result<()> {
    let mut manager = manager(args)?;

    println!("{}", describe(&mut manager));

    Ok(())
}
