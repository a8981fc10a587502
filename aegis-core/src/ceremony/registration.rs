//! Credential registration ceremony.

use std::sync::Arc;

use crate::challenge::{CeremonyKind, ChallengeStore};
use crate::credential::{Credential, CredentialStore, UserIdentity};
use crate::error::{CeremonyError, Result};
use crate::rp::RelyingParty;
use crate::verifier::{CredentialVerifier, RegistrationResponse};

use super::ACCEPTED_ALGORITHMS;

/// Options returned by [`RegistrationCeremony::begin`], relayed to the
/// client as `PublicKeyCredentialCreationOptions`.
#[derive(Debug, Clone)]
pub struct RegistrationOptions {
    pub challenge: Vec<u8>,
    pub rp_id: String,
    pub rp_name: String,
    pub user: UserIdentity,
    /// COSE algorithm identifiers, in preference order.
    pub algorithms: Vec<i64>,
    /// IDs the user already owns, so authenticators refuse to
    /// re-register the same key.
    pub exclude_credentials: Vec<Vec<u8>>,
}

/// Orchestrates credential enrollment.
pub struct RegistrationCeremony {
    challenges: Arc<ChallengeStore>,
    credentials: Arc<CredentialStore>,
    verifier: Arc<dyn CredentialVerifier>,
    rp: RelyingParty,
}

impl RegistrationCeremony {
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

    /// Start registration for `username`, creating the user identity on
    /// first contact.
    ///
    /// Issuing the challenge invalidates any unconsumed registration
    /// challenge the user already had.
    pub fn begin(&self, username: &str) -> RegistrationOptions {
        let user = self.credentials.resolve_or_create_user(username);
        let challenge = self
            .challenges
            .issue(user.handle(), CeremonyKind::Registration);
        let exclude_credentials = self
            .credentials
            .list(user.handle())
            .iter()
            .map(|credential| credential.id().to_vec())
            .collect();

        RegistrationOptions {
            challenge: challenge.bytes().to_vec(),
            rp_id: self.rp.id().to_string(),
            rp_name: self.rp.name().to_string(),
            user,
            algorithms: ACCEPTED_ALGORITHMS.to_vec(),
            exclude_credentials,
        }
    }

    /// Finish registration with the authenticator's attestation response.
    ///
    /// The challenge is consumed before the verifier runs: a response
    /// that fails verification burns its challenge and the client must
    /// restart from `begin`.
    pub fn complete(
        &self,
        username: &str,
        response: &RegistrationResponse,
    ) -> Result<Credential> {
        let user = self
            .credentials
            .user_by_name(username)
            .ok_or(CeremonyError::UnknownUser)?;
        let challenge = self.challenges.consume(
            user.handle(),
            CeremonyKind::Registration,
            &response.client_challenge,
        )?;

        // Verifier runs outside any store lock.
        let verified = self
            .verifier
            .verify_attestation(response, challenge.bytes(), &self.rp)?;

        self.credentials.add(
            user.handle(),
            &verified.credential_id,
            &verified.public_key,
            verified.sign_count,
        )
    }
}
