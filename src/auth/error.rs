use std::fmt::Display;
use thiserror::Error;

/// Message used when an internal failure carries no text of its own.
pub const INTERNAL_FALLBACK: &str = "internal server error";

/// Failure modes of a single authentication attempt.
///
/// `InvalidCredentials` covers both an unknown email and a wrong password; the
/// two causes are deliberately indistinguishable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("both credential fields must be filled")]
    InvalidRequest,
    #[error("invalid user or password")]
    InvalidCredentials,
    #[error("{0}")]
    Internal(String),
}

impl AuthError {
    /// Wraps a downstream failure, keeping its message when it has one.
    pub fn internal(source: impl Display) -> Self {
        let message = source.to_string();
        if message.trim().is_empty() {
            Self::Internal(INTERNAL_FALLBACK.to_string())
        } else {
            Self::Internal(message)
        }
    }

    /// Stable machine-readable tag used on the wire.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Internal(_) => "internal",
        }
    }
}
