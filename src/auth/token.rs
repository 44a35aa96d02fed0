//! Session token issuance and decoding. Tokens are `HS256` JWTs carrying the
//! user id plus `iat`/`exp` in Unix seconds. Clients read `exp` without the
//! secret through [`decode_unverified`]; that function establishes nothing
//! about authenticity and must only be used for local expiry checks.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration, time::SystemTime};
use thiserror::Error;

/// Session lifetime used unless configured otherwise.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// A token is expired once `now` reaches `exp`.
    #[must_use]
    pub const fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("signing secret is not configured")]
    MissingSecret,
    #[error("invalid token ttl")]
    InvalidTtl,
    #[error("token error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Issues session tokens for a subject.
pub trait TokenSigner: Send + Sync {
    /// # Errors
    /// Returns an error if the ttl is unusable or encoding fails.
    fn sign(&self, subject_id: &str, ttl: Duration) -> Result<String, TokenError>;
}

#[must_use]
pub fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// HMAC-SHA256 signer holding the process-wide secret.
#[derive(Clone)]
pub struct JwtSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtSigner {
    /// Builds a signer, failing closed on an empty secret.
    ///
    /// # Errors
    /// Returns [`TokenError::MissingSecret`] if the secret is blank.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let secret = secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    /// Signs a token as if issued at `issued_at`.
    ///
    /// # Errors
    /// Returns an error if the ttl is zero or overflows, or encoding fails.
    pub fn sign_at(
        &self,
        subject_id: &str,
        issued_at: i64,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let ttl = i64::try_from(ttl.as_secs()).map_err(|_| TokenError::InvalidTtl)?;
        if ttl == 0 {
            return Err(TokenError::InvalidTtl);
        }
        let exp = issued_at.checked_add(ttl).ok_or(TokenError::InvalidTtl)?;

        let claims = Claims {
            user_id: subject_id.to_string(),
            iat: issued_at,
            exp,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Verifies signature and expiry, returning the claims.
    ///
    /// # Errors
    /// Returns an error if the token is malformed, forged or expired.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }
}

impl TokenSigner for JwtSigner {
    fn sign(&self, subject_id: &str, ttl: Duration) -> Result<String, TokenError> {
        self.sign_at(subject_id, now_unix_seconds(), ttl)
    }
}

impl fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSigner")
            .field("algorithm", &Algorithm::HS256)
            .field("secret", &"***")
            .finish()
    }
}

/// Reads the claims of a token without checking its signature or expiry.
///
/// # Errors
/// Returns an error if the token is not a well-formed JWT with [`Claims`].
pub fn decode_unverified(token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    Ok(decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?.claims)
}
