use crate::cli::actions::{Action, server, session};
use anyhow::Result;

/// Execute the provided action.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Server(args) => server::execute(args).await,
        Action::HashPassword(args) => server::hash(&args),
        Action::Login(args) => session::login(args).await,
        Action::Logout(args) => session::logout(&args),
        Action::Status(args) => session::status(&args),
    }
}
