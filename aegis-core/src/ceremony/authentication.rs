//! Credential authentication ceremony.
//!
//! Carries the counter/clone-detection logic: every successful assertion
//! must advance the stored signature counter (unless the authenticator
//! never counts), and a regression is surfaced as a security rejection.

use std::sync::Arc;

use crate::challenge::{CeremonyKind, ChallengeStore};
use crate::credential::{CredentialStore, UserIdentity};
use crate::error::{CeremonyError, Result};
use crate::rp::RelyingParty;
use crate::verifier::{AuthenticationResponse, CredentialVerifier};

use super::{CEREMONY_TIMEOUT_MS, DISCOVERY_HANDLE};

/// Options returned by [`AuthenticationCeremony::begin`], relayed to the
/// client as `PublicKeyCredentialRequestOptions`.
#[derive(Debug, Clone)]
pub struct AuthenticationOptions {
    pub challenge: Vec<u8>,
    /// IDs the user may answer with; empty for the discoverable flow.
    pub allow_credentials: Vec<Vec<u8>>,
    pub timeout_ms: u32,
    pub rp_id: String,
}

/// Orchestrates proof of possession of a registered credential.
pub struct AuthenticationCeremony {
    challenges: Arc<ChallengeStore>,
    credentials: Arc<CredentialStore>,
    verifier: Arc<dyn CredentialVerifier>,
    rp: RelyingParty,
}

impl AuthenticationCeremony {
    pub fn new(
        challenges: Arc<ChallengeStore>,
        credentials: Arc<CredentialStore>,
        verifier: Arc<dyn CredentialVerifier>,
        rp: RelyingParty,
    ) -> Self {
        Self {
            challenges,
            credentials,
            verifier,
            rp,
        }
    }

    /// Start authentication.
    ///
    /// With a username the challenge is bound to that user and the allow
    /// list carries their credentials. Without one (discoverable flow)
    /// the allow list is empty and the challenge is bound to the
    /// reserved discovery handle until `complete` resolves the user from
    /// the credential itself.
    pub fn begin(&self, username: Option<&str>) -> Result<AuthenticationOptions> {
        let (handle, allow_credentials) = match username {
            Some(name) => {
                let user = self
                    .credentials
                    .user_by_name(name)
                    .ok_or(CeremonyError::UnknownUser)?;
                let allow = self
                    .credentials
                    .list(user.handle())
                    .iter()
                    .map(|credential| credential.id().to_vec())
                    .collect();
                (user.handle().to_vec(), allow)
            }
            None => (DISCOVERY_HANDLE.to_vec(), Vec::new()),
        };

        let challenge = self.challenges.issue(&handle, CeremonyKind::Authentication);
        Ok(AuthenticationOptions {
            challenge: challenge.bytes().to_vec(),
            allow_credentials,
            timeout_ms: CEREMONY_TIMEOUT_MS,
            rp_id: self.rp.id().to_string(),
        })
    }

    /// Finish authentication with the authenticator's assertion response.
    ///
    /// Returns the authenticated identity. A counter regression aborts
    /// the ceremony after signature verification; the stored counter is
    /// left untouched so the next genuine assertion still has to beat it.
    pub fn complete(&self, response: &AuthenticationResponse) -> Result<UserIdentity> {
        let credential = self
            .credentials
            .find(&response.credential_id)
            .ok_or(CeremonyError::UnknownCredential)?;
        let user = self
            .credentials
            .user_by_handle(credential.user_handle())
            .ok_or(CeremonyError::UnknownUser)?;

        let challenge = match self.challenges.consume(
            user.handle(),
            CeremonyKind::Authentication,
            &response.client_challenge,
        ) {
            // Discoverable flow: the challenge was issued before the user
            // was known.
            Err(CeremonyError::ChallengeNotFound) => self.challenges.consume(
                DISCOVERY_HANDLE,
                CeremonyKind::Authentication,
                &response.client_challenge,
            )?,
            other => other?,
        };

        // Verifier runs outside any store lock.
        let reported = self.verifier.verify_assertion(
            response,
            credential.public_key(),
            challenge.bytes(),
            &self.rp,
        )?;

        self.credentials
            .update_counter(credential.id(), reported)?;
        Ok(user)
    }
}
