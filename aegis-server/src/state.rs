//! Application state module
//!
//! Defines shared state accessible across all request handlers. The
//! stores are constructed here once and shared by reference; the
//! ceremonies themselves are stateless.

use std::sync::Arc;

use aegis_core::{
    AuthenticationCeremony, ChallengeStore, CredentialStore, CredentialVerifier, Fido2Verifier,
    RegistrationCeremony, RelyingPartyError,
};

use crate::config::Config;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Registration ceremony orchestrator
    pub registration: Arc<RegistrationCeremony>,
    /// Authentication ceremony orchestrator
    pub authentication: Arc<AuthenticationCeremony>,
    /// Challenge store, shared for the periodic expiry sweep
    pub challenges: Arc<ChallengeStore>,
    /// Credential store, shared for health statistics
    pub credentials: Arc<CredentialStore>,
}

impl AppState {
    /// Build state with the production FIDO2 verifier.
    pub fn from_config(config: &Config) -> Result<Self, RelyingPartyError> {
        Self::with_verifier(config, Arc::new(Fido2Verifier::new()))
    }

    /// Build state with a custom verifier (integration tests inject
    /// stubs here).
    pub fn with_verifier(
        config: &Config,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Result<Self, RelyingPartyError> {
        let rp = config.relying_party()?;
        let challenges = Arc::new(ChallengeStore::with_ttl(config.challenge_ttl()));
        let credentials = Arc::new(CredentialStore::new());

        let registration = Arc::new(RegistrationCeremony::new(
            challenges.clone(),
            credentials.clone(),
            verifier.clone(),
            rp.clone(),
        ));
        let authentication = Arc::new(AuthenticationCeremony::new(
            challenges.clone(),
            credentials.clone(),
            verifier,
            rp,
        ));

        Ok(Self {
            registration,
            authentication,
            challenges,
            credentials,
        })
    }
}
