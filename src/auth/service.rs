use crate::auth::{
    error::AuthError,
    models::{Credentials, LoginResponse},
    password::PasswordVerifier,
    store::UserStore,
    token::{DEFAULT_TOKEN_TTL, TokenSigner},
};
use std::{fmt, sync::Arc, time::Duration};
use tracing::{debug, error, instrument};

/// Authenticates credentials and issues session tokens.
///
/// The service keeps no per-call state: the store, verifier and signer are
/// shared read-only across calls.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    verifier: Arc<dyn PasswordVerifier>,
    signer: Arc<dyn TokenSigner>,
    token_ttl: Duration,
    timeout: Option<Duration>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        verifier: Arc<dyn PasswordVerifier>,
        signer: Arc<dyn TokenSigner>,
    ) -> Self {
        Self {
            users,
            verifier,
            signer,
            token_ttl: DEFAULT_TOKEN_TTL,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Bounds the lookup/verify/sign sequence as a whole.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates credentials and returns a signed token with the user profile.
    ///
    /// # Errors
    /// - [`AuthError::InvalidRequest`] when either field is empty.
    /// - [`AuthError::InvalidCredentials`] when the user is unknown or the
    ///   password does not match.
    /// - [`AuthError::Internal`] when a dependency fails or the call times out.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        if credentials.email.is_empty() || credentials.password.is_empty() {
            debug!("Missing email or password");

            return Err(AuthError::InvalidRequest);
        }

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.issue(credentials))
                .await
                .map_err(|_| {
                    error!("Authentication timed out after {:?}", limit);

                    AuthError::internal("authentication timed out")
                })?,
            None => self.issue(credentials).await,
        }
    }

    async fn issue(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        let user = self
            .users
            .find_by_email(&credentials.email)
            .await
            .map_err(|e| {
                error!("Error looking up user: {}", e);

                AuthError::internal(e)
            })?;

        let Some(user) = user else {
            debug!("User not found");

            return Err(AuthError::InvalidCredentials);
        };

        let valid = self
            .verifier
            .verify(&credentials.password, &user.password_hash)
            .await
            .map_err(|e| {
                error!("Error verifying password: {}", e);

                AuthError::internal(e)
            })?;

        if !valid {
            debug!("Password mismatch");

            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer.sign(&user.id, self.token_ttl).map_err(|e| {
            error!("Error signing token: {}", e);

            AuthError::internal(e)
        })?;

        debug!("Login successful");

        Ok(LoginResponse {
            token,
            user: user.profile(),
        })
    }
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("token_ttl", &self.token_ttl)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
