use clap::{Arg, Command};

pub const CMD_SERVER: &str = "server";
pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL: &str = "token-ttl-seconds";
pub const ARG_AUTH_TIMEOUT: &str = "auth-timeout-seconds";
pub const CMD_HASH_PASSWORD: &str = "hash-password";
pub const ARG_PASSWORD: &str = "password";

#[must_use]
pub fn subcommand() -> Command {
    Command::new(CMD_SERVER)
        .about("Serve the login API")
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("BONDY_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string")
                .env("BONDY_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign session tokens")
                .env("BONDY_JWT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL)
                .long(ARG_TOKEN_TTL)
                .help("Session token lifetime in seconds")
                .default_value("86400")
                .env("BONDY_TOKEN_TTL_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_AUTH_TIMEOUT)
                .long(ARG_AUTH_TIMEOUT)
                .help("Upper bound in seconds for a single authentication")
                .default_value("10")
                .env("BONDY_AUTH_TIMEOUT_SECONDS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}

/// Prints a `bcrypt` hash for the `users.password` column.
#[must_use]
pub fn hash_subcommand() -> Command {
    Command::new(CMD_HASH_PASSWORD)
        .about("Hash a password for storing in the users table")
        .arg(
            Arg::new(ARG_PASSWORD)
                .long(ARG_PASSWORD)
                .help("Password to hash")
                .env("BONDY_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}
