//! Aegis Server Library - REST API components for the WebAuthn relying party
//!
//! This library exposes the server components for use in integration
//! tests. The main binary uses these same components.

pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod types;

pub use config::Config;
pub use error::ApiError;
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
