//! Client for the login endpoint. Requests carry the plaintext password, so
//! neither the request body nor the returned token is ever logged here.

use crate::{
    APP_USER_AGENT,
    auth::{Credentials, ErrorResponse, LoginResponse},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Default request timeout applied to the login call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Rejected {
        status: u16,
        kind: Option<String>,
        message: String,
    },
    #[error("Request timed out. Please try again.")]
    Timeout,
    #[error("Unable to reach the server: {0}")]
    Network(String),
    #[error("Failed to decode response: {0}")]
    Parse(String),
    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}

/// Performs one authenticate round trip.
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    client: Client,
    login_url: Url,
}

impl HttpAuthClient {
    /// # Errors
    /// Returns an error if the endpoint is not an absolute URL or the HTTP
    /// client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self, ClientError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Returns an error if the endpoint is not an absolute URL or the HTTP
    /// client cannot be built.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let login_url = login_url(endpoint)?;
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self { client, login_url })
    }
}

fn login_url(endpoint: &str) -> Result<Url, ClientError> {
    let endpoint = endpoint.trim();
    let base = if endpoint.ends_with('/') {
        endpoint.to_string()
    } else {
        format!("{endpoint}/")
    };

    Url::parse(&base)
        .and_then(|url| url.join("login"))
        .map_err(|e| ClientError::Endpoint(format!("{endpoint}: {e}")))
}

fn map_request_error(err: &reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Network(err.to_string())
    }
}

/// Extracts the server's message from an error body, falling back to a
/// trimmed and truncated copy of the raw text.
fn rejection(status: StatusCode, body: &str) -> ClientError {
    if let Ok(ErrorResponse { error }) = serde_json::from_str::<ErrorResponse>(body) {
        return ClientError::Rejected {
            status: status.as_u16(),
            kind: Some(error.kind),
            message: error.message,
        };
    }

    ClientError::Rejected {
        status: status.as_u16(),
        kind: None,
        message: sanitize_body(body),
    }
}

fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[async_trait]
impl AuthClient for HttpAuthClient {
    #[instrument(skip_all, fields(url = %self.login_url))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
        let response = self
            .client
            .post(self.login_url.clone())
            .json(credentials)
            .send()
            .await
            .map_err(|e| map_request_error(&e))?;

        let status = response.status();
        debug!("Login response status: {}", status);

        if status.is_success() {
            response
                .json::<LoginResponse>()
                .await
                .map_err(|e| ClientError::Parse(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(rejection(status, &body))
        }
    }
}
