//! Aegis Core - WebAuthn relying-party ceremony library
//!
//! Orchestrates the registration and authentication ceremonies of a
//! WebAuthn relying party: single-use challenge lifecycle, credential
//! storage with cross-user uniqueness, and counter-based clone
//! detection. Cryptographic response validation sits behind the
//! [`verifier::CredentialVerifier`] capability; [`verifier::Fido2Verifier`]
//! is the production implementation and [`verifier::MockVerifier`] serves
//! tests.
//!
//! The stores are plain owned objects: construct them per deployment (or
//! per test), share them with `Arc`, and hand them to the ceremonies.
//! Nothing in this crate is a process-wide singleton.

pub mod ceremony;
pub mod challenge;
pub mod credential;
pub mod error;
pub mod rp;
pub mod verifier;

pub use ceremony::{
    AuthenticationCeremony, AuthenticationOptions, RegistrationCeremony, RegistrationOptions,
    ACCEPTED_ALGORITHMS, CEREMONY_TIMEOUT_MS,
};
pub use challenge::{
    CeremonyKind, Challenge, ChallengeStore, CHALLENGE_LEN, DEFAULT_CHALLENGE_TTL,
};
pub use credential::{Credential, CredentialStore, UserIdentity, USER_HANDLE_LEN};
pub use error::{CeremonyError, Result};
pub use rp::{RelyingParty, RelyingPartyError};
pub use verifier::{
    AuthenticationResponse, CredentialVerifier, Fido2Verifier, MockVerifier,
    RegistrationResponse, VerifiedCredential,
};
