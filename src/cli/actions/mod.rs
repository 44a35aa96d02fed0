pub mod server;
pub mod session;

mod run;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    HashPassword(server::HashArgs),
    Login(session::LoginArgs),
    Logout(session::Args),
    Status(session::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
