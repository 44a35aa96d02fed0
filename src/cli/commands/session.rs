use clap::{Arg, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_STATUS: &str = "status";
pub const ARG_ENDPOINT: &str = "endpoint";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ENDPOINT)
                .short('e')
                .long(ARG_ENDPOINT)
                .help("Base URL of the login API")
                .default_value("http://localhost:8080")
                .env("BONDY_ENDPOINT"),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long(ARG_SESSION_FILE)
                .help("Where the session is persisted (default: <config dir>/bondy-login/session.json)")
                .env("BONDY_SESSION_FILE"),
        )
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    let login = Command::new(CMD_LOGIN)
        .about("Authenticate and persist a session")
        .arg(
            Arg::new(ARG_EMAIL)
                .long(ARG_EMAIL)
                .help("Account email")
                .env("BONDY_EMAIL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_PASSWORD)
                .long(ARG_PASSWORD)
                .help("Account password")
                .env("BONDY_PASSWORD")
                .hide_env_values(true)
                .required(true),
        );

    vec![
        with_session_args(login),
        with_session_args(Command::new(CMD_LOGOUT).about("Discard the persisted session")),
        with_session_args(Command::new(CMD_STATUS).about("Show the current session")),
    ]
}
