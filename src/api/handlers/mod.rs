pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

// common functions for the handlers
use crate::auth::{AuthError, ErrorDetail, ErrorResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

#[must_use]
pub const fn status_for(error: &AuthError) -> StatusCode {
    match error {
        AuthError::InvalidRequest => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorDetail {
                kind: self.kind().to_string(),
                message: self.to_string(),
            },
        };

        (status_for(&self), Json(body)).into_response()
    }
}
