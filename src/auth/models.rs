//! Request and response types for the login exchange. `Credentials` and
//! `UserRecord` carry secret material and redact it from `Debug` output;
//! `SessionProfile` is the only user-shaped value that crosses the wire.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(ToSchema, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// A stored user as returned by a [`crate::auth::UserStore`].
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub password_hash: String,
}

impl UserRecord {
    /// Strips the password hash, leaving what may be sent to a client.
    #[must_use]
    pub fn profile(&self) -> SessionProfile {
        SessionProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            company: self.company.clone(),
        }
    }
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("company", &self.company)
            .field("password_hash", &"***")
            .finish()
    }
}

#[derive(ToSchema, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
/// Non-secret user data returned on login and stored by the client.
pub struct SessionProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
}

#[derive(ToSchema, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionProfile,
}

#[derive(ToSchema, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

#[derive(ToSchema, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}
