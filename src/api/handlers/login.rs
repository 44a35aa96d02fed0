use crate::auth::{AuthError, AuthService, Credentials, ErrorResponse, LoginResponse};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path= "/login",
    request_body = Credentials,
    responses (
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Email or password missing", body = ErrorResponse),
        (status = 401, description = "Invalid user or password", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse),
    ),
    tag= "login"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Json<Credentials>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        debug!("Missing or malformed payload");

        return AuthError::InvalidRequest.into_response();
    };

    match auth.authenticate(&credentials).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}
