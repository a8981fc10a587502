//! Single-use ceremony challenges.
//!
//! Challenges are temporary and live in memory only. At most one
//! unconsumed challenge exists per (user handle, ceremony kind) pair:
//! issuing a new one replaces the previous entry. Entries disappear when
//! consumed, when they are found expired, or during a periodic sweep.

use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CeremonyError, Result};

/// Challenge length in bytes.
pub const CHALLENGE_LEN: usize = 32;

/// Default time-to-live for an unconsumed challenge.
pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(300);

/// The ceremony a challenge was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CeremonyKind {
    Registration,
    Authentication,
}

/// A single-use challenge bound to a user and a ceremony kind.
#[derive(Debug, Clone)]
pub struct Challenge {
    bytes: Vec<u8>,
    user_handle: Vec<u8>,
    kind: CeremonyKind,
    issued_at: Instant,
}

impl Challenge {
    /// The random challenge bytes sent to the client.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Handle of the user this challenge is bound to.
    pub fn user_handle(&self) -> &[u8] {
        &self.user_handle
    }

    pub fn kind(&self) -> CeremonyKind {
        self.kind
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.issued_at.elapsed() > ttl
    }
}

/// In-memory store of unconsumed challenges.
pub struct ChallengeStore {
    entries: DashMap<(Vec<u8>, CeremonyKind), Challenge>,
    ttl: Duration,
}

impl ChallengeStore {
    /// Create a store with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CHALLENGE_TTL)
    }

    /// Create a store with a custom challenge TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Issue a fresh challenge for (user handle, kind).
    ///
    /// Replaces any prior unconsumed challenge for the same pair; the
    /// superseded challenge can no longer be consumed.
    pub fn issue(&self, user_handle: &[u8], kind: CeremonyKind) -> Challenge {
        let mut bytes = vec![0u8; CHALLENGE_LEN];
        OsRng.fill_bytes(&mut bytes);

        let challenge = Challenge {
            bytes,
            user_handle: user_handle.to_vec(),
            kind,
            issued_at: Instant::now(),
        };
        self.entries
            .insert((user_handle.to_vec(), kind), challenge.clone());
        tracing::debug!(
            user_handle = %hex::encode(user_handle),
            ?kind,
            "challenge issued"
        );
        challenge
    }

    /// Consume the active challenge for (user handle, kind).
    ///
    /// The lookup, comparison, and removal happen under the map's entry
    /// lock: even with concurrent callers presenting the same valid
    /// challenge, exactly one receives it.
    pub fn consume(
        &self,
        user_handle: &[u8],
        kind: CeremonyKind,
        presented: &[u8],
    ) -> Result<Challenge> {
        match self.entries.entry((user_handle.to_vec(), kind)) {
            Entry::Vacant(_) => Err(CeremonyError::ChallengeNotFound),
            Entry::Occupied(entry) => {
                if entry.get().is_expired(self.ttl) {
                    entry.remove();
                    return Err(CeremonyError::ChallengeExpired);
                }
                if entry.get().bytes != presented {
                    // A mismatch leaves the entry in place.
                    return Err(CeremonyError::ChallengeMismatch);
                }
                Ok(entry.remove())
            }
        }
    }

    /// Remove expired challenges (called periodically).
    pub fn sweep_expired(&self) {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, challenge| !challenge.is_expired(ttl));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "expired challenges swept");
        }
    }

    /// Number of pending (unconsumed) challenges.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ChallengeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChallengeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeStore")
            .field("pending", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};

    const USER: &[u8] = b"user-handle-1";

    #[test]
    fn test_issue_then_consume() {
        let store = ChallengeStore::new();
        let challenge = store.issue(USER, CeremonyKind::Registration);
        assert_eq!(challenge.bytes().len(), CHALLENGE_LEN);

        let consumed = store
            .consume(USER, CeremonyKind::Registration, challenge.bytes())
            .unwrap();
        assert_eq!(consumed.bytes(), challenge.bytes());
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn test_consume_is_single_use() {
        let store = ChallengeStore::new();
        let challenge = store.issue(USER, CeremonyKind::Authentication);

        store
            .consume(USER, CeremonyKind::Authentication, challenge.bytes())
            .unwrap();
        let err = store
            .consume(USER, CeremonyKind::Authentication, challenge.bytes())
            .unwrap_err();
        assert_eq!(err, CeremonyError::ChallengeNotFound);
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let store = ChallengeStore::new();
        let reg = store.issue(USER, CeremonyKind::Registration);
        let auth = store.issue(USER, CeremonyKind::Authentication);

        assert_ne!(reg.bytes(), auth.bytes());
        store
            .consume(USER, CeremonyKind::Registration, reg.bytes())
            .unwrap();
        store
            .consume(USER, CeremonyKind::Authentication, auth.bytes())
            .unwrap();
    }

    #[test]
    fn test_reissue_invalidates_prior_challenge() {
        let store = ChallengeStore::new();
        let old = store.issue(USER, CeremonyKind::Registration);
        let new = store.issue(USER, CeremonyKind::Registration);

        // The superseded bytes no longer consume anything.
        let err = store
            .consume(USER, CeremonyKind::Registration, old.bytes())
            .unwrap_err();
        assert_eq!(err, CeremonyError::ChallengeMismatch);

        // The replacement is still live.
        store
            .consume(USER, CeremonyKind::Registration, new.bytes())
            .unwrap();
    }

    #[test]
    fn test_mismatch_leaves_challenge_intact() {
        let store = ChallengeStore::new();
        let challenge = store.issue(USER, CeremonyKind::Registration);

        let err = store
            .consume(USER, CeremonyKind::Registration, b"wrong bytes")
            .unwrap_err();
        assert_eq!(err, CeremonyError::ChallengeMismatch);
        assert_eq!(store.pending(), 1);

        store
            .consume(USER, CeremonyKind::Registration, challenge.bytes())
            .unwrap();
    }

    #[test]
    fn test_expired_challenge_is_purged() {
        let store = ChallengeStore::with_ttl(Duration::from_millis(1));
        let challenge = store.issue(USER, CeremonyKind::Authentication);
        std::thread::sleep(Duration::from_millis(10));

        let err = store
            .consume(USER, CeremonyKind::Authentication, challenge.bytes())
            .unwrap_err();
        assert_eq!(err, CeremonyError::ChallengeExpired);

        // Purged on access: a retry sees no challenge at all.
        let err = store
            .consume(USER, CeremonyKind::Authentication, challenge.bytes())
            .unwrap_err();
        assert_eq!(err, CeremonyError::ChallengeNotFound);
    }

    #[test]
    fn test_sweep_removes_expired_entries() {
        let store = ChallengeStore::with_ttl(Duration::from_millis(1));
        store.issue(USER, CeremonyKind::Registration);
        store.issue(b"other-user", CeremonyKind::Authentication);
        std::thread::sleep(Duration::from_millis(10));

        store.sweep_expired();
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn test_concurrent_consume_has_one_winner() {
        let store = Arc::new(ChallengeStore::new());
        let challenge = store.issue(USER, CeremonyKind::Authentication);
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let barrier = barrier.clone();
                let bytes = challenge.bytes().to_vec();
                std::thread::spawn(move || {
                    barrier.wait();
                    store.consume(USER, CeremonyKind::Authentication, &bytes)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        for result in results.iter().filter(|r| r.is_err()) {
            assert_eq!(
                result.as_ref().unwrap_err(),
                &CeremonyError::ChallengeNotFound
            );
        }
    }
}
