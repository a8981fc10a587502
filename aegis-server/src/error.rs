//! API error handling module
//!
//! Maps core ceremony failures and transport-level problems onto HTTP
//! responses with a stable `{error, code}` JSON body. Security-relevant
//! rejections are logged distinctly from ordinary client errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use aegis_core::CeremonyError;

/// API error type for all endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Ceremony failure from the core
    #[error(transparent)]
    Ceremony(#[from] CeremonyError),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Ceremony(e) => match e {
                CeremonyError::ChallengeNotFound
                | CeremonyError::ChallengeExpired
                | CeremonyError::ChallengeMismatch => StatusCode::BAD_REQUEST,

                CeremonyError::UnknownUser | CeremonyError::UnknownCredential => {
                    StatusCode::NOT_FOUND
                }

                CeremonyError::DuplicateCredential => StatusCode::CONFLICT,

                // Security-relevant rejections
                CeremonyError::AttestationInvalid(_)
                | CeremonyError::AssertionInvalid(_)
                | CeremonyError::CounterRegression { .. } => StatusCode::UNAUTHORIZED,
            },
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Ceremony(e) => match e {
                CeremonyError::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
                CeremonyError::ChallengeExpired => "CHALLENGE_EXPIRED",
                CeremonyError::ChallengeMismatch => "CHALLENGE_MISMATCH",
                CeremonyError::DuplicateCredential => "DUPLICATE_CREDENTIAL",
                CeremonyError::UnknownCredential => "UNKNOWN_CREDENTIAL",
                CeremonyError::CounterRegression { .. } => "COUNTER_REGRESSION",
                CeremonyError::AttestationInvalid(_) => "ATTESTATION_INVALID",
                CeremonyError::AssertionInvalid(_) => "ASSERTION_INVALID",
                CeremonyError::UnknownUser => "UNKNOWN_USER",
            },
        }
    }

    /// Whether this failure indicates a possible attack rather than a
    /// malformed or stale request.
    fn is_security_rejection(&self) -> bool {
        matches!(
            self,
            Self::Ceremony(
                CeremonyError::AttestationInvalid(_)
                    | CeremonyError::AssertionInvalid(_)
                    | CeremonyError::CounterRegression { .. }
            )
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        if self.is_security_rejection() {
            tracing::error!(
                status = %status,
                code = code,
                error = %message,
                "Security rejection"
            );
        } else if status.is_server_error() {
            tracing::error!(
                status = %status,
                code = code,
                error = %message,
                "Server error"
            );
        } else {
            tracing::warn!(
                status = %status,
                code = code,
                error = %message,
                "Client error"
            );
        }

        let body = serde_json::json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
