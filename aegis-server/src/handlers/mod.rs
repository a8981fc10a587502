//! HTTP request handlers.

pub mod health;
pub mod webauthn;

pub use health::{health, HealthResponse};
pub use webauthn::{
    authenticate_begin, authenticate_complete, register_begin, register_complete,
};
