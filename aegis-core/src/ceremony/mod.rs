//! Ceremony orchestration.
//!
//! Registration and authentication are stateless orchestrators over the
//! challenge store, the credential store, and the verifier capability;
//! the stores hold all state. A `begin` issues a challenge and returns
//! client options; the matching `complete` consumes that challenge
//! exactly once, runs the verifier with no store lock held, and mutates
//! the credential store on success.

mod authentication;
mod registration;

pub use authentication::{AuthenticationCeremony, AuthenticationOptions};
pub use registration::{RegistrationCeremony, RegistrationOptions};

use crate::verifier::fido2::COSE_ALG_ES256;

/// COSE algorithms advertised to clients, in preference order.
pub const ACCEPTED_ALGORITHMS: &[i64] = &[COSE_ALG_ES256];

/// Client-side ceremony timeout hint (milliseconds).
pub const CEREMONY_TIMEOUT_MS: u32 = 60_000;

/// Reserved challenge binding for username-less (discoverable-credential)
/// authentication: the user is only known once the credential arrives at
/// `complete`.
pub(crate) const DISCOVERY_HANDLE: &[u8] = &[];
