//! Server-side authentication: credential validation and session token
//! issuance. The service depends on three capabilities (user lookup, password
//! verification, token signing) expressed as traits so each can be swapped or
//! doubled in tests.
//!
//! Flow Overview: reject empty fields, look the user up by exact email, verify
//! the password against the stored hash, sign a token for the user id and
//! return it with the user's profile. Each step runs only after the previous
//! one succeeded.

pub mod error;
pub mod models;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use models::{Credentials, ErrorDetail, ErrorResponse, LoginResponse, SessionProfile, UserRecord};
pub use password::{BcryptVerifier, PasswordVerifier};
pub use service::AuthService;
pub use store::{MemoryUserStore, PgUserStore, UserStore};
pub use token::{Claims, JwtSigner, TokenSigner};
