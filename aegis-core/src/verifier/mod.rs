//! Attestation/assertion verification capability.
//!
//! The ceremony core never inspects authenticator responses itself; all
//! structural and cryptographic validation sits behind the
//! [`CredentialVerifier`] trait. [`fido2::Fido2Verifier`] is the
//! production implementation; [`mock::MockVerifier`] skips cryptography
//! for tests.

pub mod fido2;
pub mod mock;

pub use fido2::Fido2Verifier;
pub use mock::MockVerifier;

use crate::error::Result;
use crate::rp::RelyingParty;

/// Decoded registration (attestation) response.
///
/// All fields are raw bytes; transport encodings are stripped at the API
/// boundary before the core sees them.
#[derive(Debug, Clone)]
pub struct RegistrationResponse {
    /// Challenge the client claims to answer, lifted out of
    /// clientDataJSON at the boundary.
    pub client_challenge: Vec<u8>,
    /// Raw clientDataJSON bytes.
    pub client_data_json: Vec<u8>,
    /// Raw CBOR attestation object.
    pub attestation_object: Vec<u8>,
}

/// Decoded authentication (assertion) response.
#[derive(Debug, Clone)]
pub struct AuthenticationResponse {
    /// ID of the credential the client claims to control.
    pub credential_id: Vec<u8>,
    /// Challenge the client claims to answer.
    pub client_challenge: Vec<u8>,
    /// Raw clientDataJSON bytes.
    pub client_data_json: Vec<u8>,
    /// Raw authenticator data.
    pub authenticator_data: Vec<u8>,
    /// Assertion signature (DER).
    pub signature: Vec<u8>,
    /// User handle reported by the authenticator, if any.
    pub user_handle: Option<Vec<u8>>,
}

/// Credential material produced by a successful attestation check.
#[derive(Debug, Clone)]
pub struct VerifiedCredential {
    pub credential_id: Vec<u8>,
    /// COSE public key bytes, opaque to the ceremony core.
    pub public_key: Vec<u8>,
    /// Initial signature counter reported by the authenticator.
    pub sign_count: u32,
}

/// Verification capability the ceremonies call into.
///
/// Implementations must be thread-safe (`Send + Sync`); ceremonies invoke
/// them with no store lock held.
pub trait CredentialVerifier: Send + Sync {
    /// Validate an attestation response against the expected challenge
    /// and relying-party identity.
    ///
    /// Fails with `AttestationInvalid` on any structural or cryptographic
    /// mismatch; success yields the parsed credential material.
    fn verify_attestation(
        &self,
        response: &RegistrationResponse,
        expected_challenge: &[u8],
        rp: &RelyingParty,
    ) -> Result<VerifiedCredential>;

    /// Validate an assertion response against a stored public key.
    ///
    /// Fails with `AssertionInvalid` on any mismatch; success yields the
    /// authenticator's reported signature counter.
    fn verify_assertion(
        &self,
        response: &AuthenticationResponse,
        public_key: &[u8],
        expected_challenge: &[u8],
        rp: &RelyingParty,
    ) -> Result<u32>;
}
