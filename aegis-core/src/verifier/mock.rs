//! Mock verifier for tests.

use crate::error::{CeremonyError, Result};
use crate::rp::RelyingParty;
use crate::verifier::{
    AuthenticationResponse, CredentialVerifier, RegistrationResponse, VerifiedCredential,
};

/// Test verifier that skips all cryptographic checks.
///
/// Attestations echo back the configured credential material; assertions
/// read the reported counter straight from the authenticator-data bytes.
/// Challenge equality is still enforced so ceremony sequencing bugs
/// surface in tests.
pub struct MockVerifier {
    credential_id: Vec<u8>,
    public_key: Vec<u8>,
    initial_count: u32,
    reject: bool,
}

impl MockVerifier {
    /// A verifier that accepts everything and reports the given
    /// credential material at registration.
    pub fn new(credential_id: impl Into<Vec<u8>>, public_key: impl Into<Vec<u8>>) -> Self {
        Self {
            credential_id: credential_id.into(),
            public_key: public_key.into(),
            initial_count: 0,
            reject: false,
        }
    }

    /// Report a nonzero counter at registration.
    pub fn with_initial_count(mut self, count: u32) -> Self {
        self.initial_count = count;
        self
    }

    /// A verifier that rejects every response.
    pub fn rejecting() -> Self {
        Self {
            credential_id: Vec::new(),
            public_key: Vec::new(),
            initial_count: 0,
            reject: true,
        }
    }
}

impl CredentialVerifier for MockVerifier {
    fn verify_attestation(
        &self,
        response: &RegistrationResponse,
        expected_challenge: &[u8],
        _rp: &RelyingParty,
    ) -> Result<VerifiedCredential> {
        if self.reject {
            return Err(CeremonyError::AttestationInvalid("mock rejection".into()));
        }
        if response.client_challenge != expected_challenge {
            return Err(CeremonyError::AttestationInvalid(
                "challenge mismatch".into(),
            ));
        }
        Ok(VerifiedCredential {
            credential_id: self.credential_id.clone(),
            public_key: self.public_key.clone(),
            sign_count: self.initial_count,
        })
    }

    fn verify_assertion(
        &self,
        response: &AuthenticationResponse,
        _public_key: &[u8],
        expected_challenge: &[u8],
        _rp: &RelyingParty,
    ) -> Result<u32> {
        if self.reject {
            return Err(CeremonyError::AssertionInvalid("mock rejection".into()));
        }
        if response.client_challenge != expected_challenge {
            return Err(CeremonyError::AssertionInvalid("challenge mismatch".into()));
        }
        // Same wire position the real verifier reads the counter from.
        let reported = response
            .authenticator_data
            .get(33..37)
            .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
            .unwrap_or(0);
        Ok(reported)
    }
}

/// Authenticator-data bytes carrying only a sign counter, for tests that
/// drive ceremonies through the mock.
pub fn mock_authenticator_data(sign_count: u32) -> Vec<u8> {
    let mut out = vec![0u8; 33];
    out.extend_from_slice(&sign_count.to_be_bytes());
    out
}
