//! WebAuthn ceremony endpoint handlers.
//!
//! Each ceremony is a begin/complete pair. Binary fields are decoded at
//! this boundary; the ceremony core only sees raw bytes.

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::state::AppState;
use crate::types::{
    encode, AuthenticateBeginRequest, AuthenticateBeginResponse, AuthenticateCompleteRequest,
    AuthenticateCompleteResponse, RegisterBeginRequest, RegisterBeginResponse,
    RegisterCompleteRequest, RegisterCompleteResponse,
};

/// POST /register/begin
///
/// Start credential registration. First contact with a username creates
/// its user identity; the response carries the creation options for
/// `navigator.credentials.create`, including the credentials the user
/// already owns so authenticators refuse to re-register them.
#[utoipa::path(
    post,
    path = "/register/begin",
    tag = "WebAuthn",
    request_body = RegisterBeginRequest,
    responses(
        (status = 200, description = "Registration challenge issued", body = RegisterBeginResponse),
        (status = 400, description = "Malformed request")
    )
)]
pub async fn register_begin(
    State(state): State<AppState>,
    Json(request): Json<RegisterBeginRequest>,
) -> Result<Json<RegisterBeginResponse>, ApiError> {
    let username = request.username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("username must not be empty"));
    }

    let options = state.registration.begin(username);
    tracing::info!(username, "registration ceremony started");

    Ok(Json(options.into()))
}

/// POST /register/complete
///
/// Finish credential registration with the authenticator's attestation
/// response. The matching challenge is consumed exactly once; a failed
/// verification requires restarting from `/register/begin`.
#[utoipa::path(
    post,
    path = "/register/complete",
    tag = "WebAuthn",
    request_body = RegisterCompleteRequest,
    responses(
        (status = 200, description = "Credential registered", body = RegisterCompleteResponse),
        (status = 400, description = "Malformed request or challenge failure"),
        (status = 401, description = "Attestation rejected"),
        (status = 404, description = "Unknown user"),
        (status = 409, description = "Credential ID already registered")
    )
)]
pub async fn register_complete(
    State(state): State<AppState>,
    Json(request): Json<RegisterCompleteRequest>,
) -> Result<Json<RegisterCompleteResponse>, ApiError> {
    let (username, payload) = request.into_core()?;
    let credential = state.registration.complete(&username, &payload)?;

    let credential_id = encode(credential.id());
    tracing::info!(
        username = %username,
        credential_id = %credential_id,
        sign_count = credential.sign_count(),
        "registration ceremony completed"
    );

    Ok(Json(RegisterCompleteResponse {
        status: "success".to_string(),
        credential_id,
        username,
    }))
}

/// POST /authenticate/begin
///
/// Start authentication. With a username the response lists that user's
/// credentials in `allowCredentials`; without one the list is empty and
/// the user is resolved from the discoverable credential at complete.
#[utoipa::path(
    post,
    path = "/authenticate/begin",
    tag = "WebAuthn",
    request_body = AuthenticateBeginRequest,
    responses(
        (status = 200, description = "Authentication challenge issued", body = AuthenticateBeginResponse),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn authenticate_begin(
    State(state): State<AppState>,
    Json(request): Json<AuthenticateBeginRequest>,
) -> Result<Json<AuthenticateBeginResponse>, ApiError> {
    let username = request
        .username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let options = state.authentication.begin(username)?;
    tracing::info!(
        username = username.unwrap_or("<discoverable>"),
        "authentication ceremony started"
    );

    Ok(Json(options.into()))
}

/// POST /authenticate/complete
///
/// Finish authentication with the authenticator's assertion response.
/// A signature-counter regression is rejected as a possible cloned
/// authenticator, not silently accepted.
#[utoipa::path(
    post,
    path = "/authenticate/complete",
    tag = "WebAuthn",
    request_body = AuthenticateCompleteRequest,
    responses(
        (status = 200, description = "Authentication succeeded", body = AuthenticateCompleteResponse),
        (status = 400, description = "Malformed request or challenge failure"),
        (status = 401, description = "Assertion rejected or counter regression"),
        (status = 404, description = "Unknown credential")
    )
)]
pub async fn authenticate_complete(
    State(state): State<AppState>,
    Json(request): Json<AuthenticateCompleteRequest>,
) -> Result<Json<AuthenticateCompleteResponse>, ApiError> {
    let payload = request.into_core()?;
    let user = state.authentication.complete(&payload)?;

    tracing::info!(
        username = %user.name(),
        credential_id = %encode(&payload.credential_id),
        "authentication ceremony completed"
    );

    Ok(Json(AuthenticateCompleteResponse {
        status: "success".to_string(),
        username: user.name().to_string(),
    }))
}
