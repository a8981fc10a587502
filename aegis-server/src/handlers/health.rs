//! Health check handler
//!
//! Provides a health endpoint for monitoring and load balancers.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Server version from Cargo.toml
    pub version: &'static str,
    /// Service name
    pub service: &'static str,
    /// Registered users
    pub users: usize,
    /// Registered credentials
    pub credentials: usize,
    /// Unconsumed ceremony challenges
    pub pending_challenges: usize,
}

/// GET /health - Health check endpoint
///
/// Returns service status together with store statistics.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "aegis-server",
        users: state.credentials.user_count(),
        credentials: state.credentials.credential_count(),
        pending_challenges: state.challenges.pending(),
    })
}
