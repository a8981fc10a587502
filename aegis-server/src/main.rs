//! Aegis Server - REST API for WebAuthn registration and authentication
//!
//! Exposes the ceremony core via HTTP endpoints:
//! - POST /register/begin | /register/complete - enroll a credential
//! - POST /authenticate/begin | /authenticate/complete - prove possession

use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aegis_server::{create_router, AppState, Config};

/// Interval between expired-challenge sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,aegis_server=debug,aegis_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(?config, "configuration loaded");

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("invalid relying-party configuration: {e}");
            std::process::exit(1);
        }
    };

    // Abandoned ceremonies leave challenges behind until their TTL; the
    // sweep keeps the store from accumulating them.
    let challenges = state.challenges.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            challenges.sweep_expired();
        }
    });

    let addr = config.socket_addr();
    let app = create_router(state, &config);

    tracing::info!(%addr, rp_id = %config.rp_id, "aegis-server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind server address");
    axum::serve(listener, app).await.expect("server error");
}
