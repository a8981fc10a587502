//! Server configuration module
//!
//! Handles loading configuration from environment variables with sensible
//! defaults.

use std::net::SocketAddr;
use std::time::Duration;

use aegis_core::{RelyingParty, RelyingPartyError};

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3000)
    pub port: u16,
    /// Server host (default: 127.0.0.1)
    pub host: [u8; 4],
    /// Relying Party ID, typically the domain (default: "localhost")
    pub rp_id: String,
    /// Human-readable Relying Party name (default: "Aegis")
    pub rp_name: String,
    /// Origins allowed to drive ceremonies, comma-separated in the
    /// environment (default: http://localhost:3000)
    pub rp_origins: Vec<String>,
    /// Challenge time-to-live in seconds (default: 300)
    pub challenge_ttl_secs: u64,
    /// Allowed CORS origins, comma-separated (default: allow all in dev)
    pub allowed_origins: Option<Vec<String>>,
    /// Request body limit in MB (default: 1)
    pub body_limit_mb: usize,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            host: [127, 0, 0, 1],
            rp_id: "localhost".to_string(),
            rp_name: "Aegis".to_string(),
            rp_origins: vec!["http://localhost:3000".to_string()],
            challenge_ttl_secs: 300,
            allowed_origins: None, // None = allow all (dev mode)
            body_limit_mb: 1,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let host = std::env::var("HOST")
            .ok()
            .map(|h| {
                if h == "0.0.0.0" {
                    [0, 0, 0, 0]
                } else {
                    [127, 0, 0, 1]
                }
            })
            .unwrap_or(defaults.host);

        let rp_id = std::env::var("WEBAUTHN_RP_ID").unwrap_or(defaults.rp_id);
        let rp_name = std::env::var("WEBAUTHN_RP_NAME").unwrap_or(defaults.rp_name);

        let rp_origins = std::env::var("WEBAUTHN_RP_ORIGINS")
            .ok()
            .map(|origins| parse_list(&origins))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.rp_origins);

        let challenge_ttl_secs = std::env::var("CHALLENGE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.challenge_ttl_secs);

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .ok()
            .map(|origins| parse_list(&origins));

        let body_limit_mb = std::env::var("BODY_LIMIT_MB")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.body_limit_mb);

        let timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.timeout_secs);

        Self {
            port,
            host,
            rp_id,
            rp_name,
            rp_origins,
            challenge_ttl_secs,
            allowed_origins,
            body_limit_mb,
            timeout_secs,
        }
    }

    /// Get socket address from config
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }

    /// Challenge TTL as a duration
    pub fn challenge_ttl(&self) -> Duration {
        Duration::from_secs(self.challenge_ttl_secs)
    }

    /// Build the relying-party identity the ceremonies are bound to
    pub fn relying_party(&self) -> Result<RelyingParty, RelyingPartyError> {
        RelyingParty::new(&self.rp_id, &self.rp_name, &self.rp_origins)
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
