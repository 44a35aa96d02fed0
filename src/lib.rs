//! # bondy-login (credential authentication and session issuance)
//!
//! `bondy-login` authenticates an email/password pair against a user store and
//! issues a signed, time-bounded session token. The same crate carries the
//! client side of the exchange: a session manager that drives the login call,
//! persists the resulting session, enforces its expiry and gates navigation.
//!
//! ## Authentication
//!
//! Validation is strictly ordered and short-circuits on the first failure:
//! both fields must be present, the email must match a stored user, and the
//! password must verify against the stored `bcrypt` hash. Unknown users and
//! wrong passwords fail with the same error kind and message so a response
//! never reveals which half of the pair was wrong.
//!
//! Tokens are `HS256` JWTs carrying `userId`, `iat` and `exp`. The signing
//! secret is loaded once at startup; the signer refuses to exist without it.
//!
//! ## Sessions
//!
//! The client persists the token and the user profile as a pair under two
//! storage keys. On startup the token's `exp` is decoded locally and an
//! expired pair is purged. The profile never carries password material.

pub mod api;
pub mod auth;
pub mod cli;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
