//! Relying Party identity.
//!
//! Every ceremony is bound to one relying party: the RP ID that
//! authenticators hash into their responses, a display name shown by
//! client platforms, and the set of web origins allowed to drive the
//! ceremony from a browser.

use url::Url;

/// Relying-party construction errors.
#[derive(Debug, thiserror::Error)]
pub enum RelyingPartyError {
    #[error("invalid origin URL: {0}")]
    InvalidOrigin(String),
    #[error("relying party needs at least one allowed origin")]
    NoOrigins,
}

/// The relying-party identity ceremonies are bound to.
#[derive(Debug, Clone)]
pub struct RelyingParty {
    id: String,
    name: String,
    /// ASCII-serialized allowed origins (scheme://host[:port]).
    origins: Vec<String>,
}

impl RelyingParty {
    /// Create a relying party.
    ///
    /// Each origin must parse as a URL; origins are normalized to their
    /// ASCII serialization so `https://localhost:5000/` and
    /// `https://localhost:5000` compare equal.
    pub fn new<S: AsRef<str>>(
        id: &str,
        name: &str,
        origins: &[S],
    ) -> Result<Self, RelyingPartyError> {
        if origins.is_empty() {
            return Err(RelyingPartyError::NoOrigins);
        }
        let origins = origins
            .iter()
            .map(|o| normalize_origin(o.as_ref()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                RelyingPartyError::InvalidOrigin(
                    origins
                        .iter()
                        .map(|o| o.as_ref().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            })?;

        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            origins,
        })
    }

    /// Relying Party ID (typically the domain name).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Human-readable relying-party name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allowed origins in normalized form.
    pub fn origins(&self) -> &[String] {
        &self.origins
    }

    /// Whether a client-reported origin is allowed for this relying party.
    pub fn allows_origin(&self, origin: &str) -> bool {
        match normalize_origin(origin) {
            Some(normalized) => self.origins.contains(&normalized),
            None => false,
        }
    }
}

/// Parse and normalize an origin string to its ASCII serialization.
fn normalize_origin(origin: &str) -> Option<String> {
    let url = Url::parse(origin).ok()?;
    let serialized = url.origin().ascii_serialization();
    // Url reports opaque origins as "null"; those never match anything.
    if serialized == "null" {
        return None;
    }
    Some(serialized)
}
