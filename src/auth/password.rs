use async_trait::async_trait;
use thiserror::Error;
use tokio::task::{JoinError, spawn_blocking};

#[derive(Debug, Error)]
pub enum HashError {
    #[error("password hash error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("password verification task failed: {0}")]
    Task(#[from] JoinError),
}

/// Checks a plaintext password against a stored hash.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashError>;
}

/// `bcrypt` verification, run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

#[async_trait]
impl PasswordVerifier for BcryptVerifier {
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashError> {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();

        Ok(spawn_blocking(move || bcrypt::verify(plaintext, &hash)).await??)
    }
}

/// Hashes a password with the default `bcrypt` cost, for seeding stores.
///
/// # Errors
/// Returns an error if `bcrypt` fails to hash the input.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    hash_password_with_cost(password, bcrypt::DEFAULT_COST)
}

/// # Errors
/// Returns an error if the cost is out of range or hashing fails.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, HashError> {
    Ok(bcrypt::hash(password, cost)?)
}
