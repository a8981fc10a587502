use thiserror::Error;

/// Request-scoped ceremony failures.
///
/// Every variant is non-fatal: the caller restarts the ceremony from
/// `begin` with a fresh challenge. Nothing here escapes the core as a
/// panic; randomness-source exhaustion is the only fatal condition and
/// aborts the process inside the entropy source itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CeremonyError {
    #[error("no active challenge for this user and ceremony")]
    ChallengeNotFound,

    #[error("challenge expired")]
    ChallengeExpired,

    #[error("presented challenge does not match the issued challenge")]
    ChallengeMismatch,

    #[error("credential ID is already registered")]
    DuplicateCredential,

    #[error("credential is not registered")]
    UnknownCredential,

    #[error("signature counter regression: stored {stored}, reported {reported}")]
    CounterRegression { stored: u32, reported: u32 },

    #[error("attestation rejected: {0}")]
    AttestationInvalid(String),

    #[error("assertion rejected: {0}")]
    AssertionInvalid(String),

    #[error("unknown user")]
    UnknownUser,
}

pub type Result<T> = std::result::Result<T, CeremonyError>;
