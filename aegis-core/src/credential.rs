//! Registered credentials and the users that own them.
//!
//! The store owns two collections: the user registry (username to
//! 32-byte handle, assigned at first registration) and the credential
//! records themselves. Credential IDs are unique across the whole store,
//! not per user; the per-user index only orders listings.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CeremonyError, Result};

/// Byte length of generated user handles.
pub const USER_HANDLE_LEN: usize = 32;

/// A user known to the relying party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    handle: Vec<u8>,
    name: String,
    display_name: String,
}

impl UserIdentity {
    /// Opaque user handle (random bytes, assigned at creation).
    pub fn handle(&self) -> &[u8] {
        &self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// One registered authenticator key.
#[derive(Debug, Clone)]
pub struct Credential {
    id: Vec<u8>,
    public_key: Vec<u8>,
    sign_count: u32,
    user_handle: Vec<u8>,
}

impl Credential {
    /// Credential ID (opaque bytes, globally unique in the store).
    pub fn id(&self) -> &[u8] {
        &self.id
    }

    /// COSE public key bytes, opaque to the ceremony core.
    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Last accepted signature counter.
    pub fn sign_count(&self) -> u32 {
        self.sign_count
    }

    /// Handle of the owning user.
    pub fn user_handle(&self) -> &[u8] {
        &self.user_handle
    }
}

/// In-memory store of users and their credentials.
pub struct CredentialStore {
    /// username -> identity
    users: DashMap<String, UserIdentity>,
    /// user handle -> username
    handles: DashMap<Vec<u8>, String>,
    /// credential ID -> record
    credentials: DashMap<Vec<u8>, Credential>,
    /// user handle -> credential IDs in insertion order
    owned: DashMap<Vec<u8>, Vec<Vec<u8>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            handles: DashMap::new(),
            credentials: DashMap::new(),
            owned: DashMap::new(),
        }
    }

    /// Look up a user by username.
    pub fn user_by_name(&self, username: &str) -> Option<UserIdentity> {
        self.users.get(username).map(|entry| entry.value().clone())
    }

    /// Look up a user by handle.
    pub fn user_by_handle(&self, handle: &[u8]) -> Option<UserIdentity> {
        let username = self.handles.get(handle)?.value().clone();
        self.user_by_name(&username)
    }

    /// Return the identity for `username`, creating it on first contact.
    ///
    /// The handle is 32 bytes of OS randomness and never changes once
    /// assigned.
    pub fn resolve_or_create_user(&self, username: &str) -> UserIdentity {
        match self.users.entry(username.to_string()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let mut handle = vec![0u8; USER_HANDLE_LEN];
                OsRng.fill_bytes(&mut handle);
                let identity = UserIdentity {
                    handle: handle.clone(),
                    name: username.to_string(),
                    display_name: username.to_string(),
                };
                entry.insert(identity.clone());
                self.handles.insert(handle, username.to_string());
                tracing::debug!(username, "user identity created");
                identity
            }
        }
    }

    /// Register a credential for a user.
    ///
    /// Fails with `DuplicateCredential` if the ID exists anywhere in the
    /// store, regardless of which user owns it.
    pub fn add(
        &self,
        user_handle: &[u8],
        credential_id: &[u8],
        public_key: &[u8],
        sign_count: u32,
    ) -> Result<Credential> {
        let credential = Credential {
            id: credential_id.to_vec(),
            public_key: public_key.to_vec(),
            sign_count,
            user_handle: user_handle.to_vec(),
        };
        match self.credentials.entry(credential_id.to_vec()) {
            Entry::Occupied(_) => return Err(CeremonyError::DuplicateCredential),
            Entry::Vacant(entry) => {
                entry.insert(credential.clone());
            }
        }
        self.owned
            .entry(user_handle.to_vec())
            .or_default()
            .push(credential_id.to_vec());
        Ok(credential)
    }

    /// Global lookup by credential ID, independent of user.
    pub fn find(&self, credential_id: &[u8]) -> Option<Credential> {
        self.credentials
            .get(credential_id)
            .map(|entry| entry.value().clone())
    }

    /// Snapshot of a user's credentials in insertion order.
    pub fn list(&self, user_handle: &[u8]) -> Vec<Credential> {
        let Some(ids) = self.owned.get(user_handle) else {
            return Vec::new();
        };
        ids.value()
            .iter()
            .filter_map(|id| self.find(id))
            .collect()
    }

    /// Record the counter reported by a successful assertion.
    ///
    /// A stored counter of zero means the authenticator does not
    /// implement counters and is never compared. Otherwise the reported
    /// value must strictly increase; anything else is the clone-detection
    /// signal.
    pub fn update_counter(&self, credential_id: &[u8], reported: u32) -> Result<u32> {
        let mut entry = self
            .credentials
            .get_mut(credential_id)
            .ok_or(CeremonyError::UnknownCredential)?;
        let stored = entry.sign_count;
        if stored != 0 && reported <= stored {
            tracing::warn!(
                credential_id = %hex::encode(credential_id),
                stored,
                reported,
                "signature counter regression - possible cloned authenticator"
            );
            return Err(CeremonyError::CounterRegression { stored, reported });
        }
        entry.sign_count = reported;
        Ok(reported)
    }

    /// Number of registered credentials.
    pub fn credential_count(&self) -> usize {
        self.credentials.len()
    }

    /// Number of known users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("users", &self.users.len())
            .field("credentials", &self.credentials.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation_is_stable() {
        let store = CredentialStore::new();
        let first = store.resolve_or_create_user("alice");
        let second = store.resolve_or_create_user("alice");

        assert_eq!(first.handle(), second.handle());
        assert_eq!(first.handle().len(), USER_HANDLE_LEN);
        assert_eq!(store.user_count(), 1);

        let by_handle = store.user_by_handle(first.handle()).unwrap();
        assert_eq!(by_handle.name(), "alice");
    }

    #[test]
    fn test_add_and_find() {
        let store = CredentialStore::new();
        let alice = store.resolve_or_create_user("alice");

        let credential = store.add(alice.handle(), b"cred-1", b"key-1", 0).unwrap();
        assert_eq!(credential.sign_count(), 0);

        let found = store.find(b"cred-1").unwrap();
        assert_eq!(found.public_key(), b"key-1");
        assert_eq!(found.user_handle(), alice.handle());
        assert!(store.find(b"cred-2").is_none());
    }

    #[test]
    fn test_duplicate_rejected_across_users() {
        let store = CredentialStore::new();
        let alice = store.resolve_or_create_user("alice");
        let bob = store.resolve_or_create_user("bob");

        store.add(alice.handle(), b"cred-1", b"key-1", 0).unwrap();
        let err = store.add(bob.handle(), b"cred-1", b"key-2", 0).unwrap_err();
        assert_eq!(err, CeremonyError::DuplicateCredential);
        assert_eq!(store.credential_count(), 1);
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let store = CredentialStore::new();
        let alice = store.resolve_or_create_user("alice");

        store.add(alice.handle(), b"cred-1", b"key", 0).unwrap();
        store.add(alice.handle(), b"cred-2", b"key", 0).unwrap();
        store.add(alice.handle(), b"cred-3", b"key", 0).unwrap();

        let ids: Vec<_> = store
            .list(alice.handle())
            .iter()
            .map(|c| c.id().to_vec())
            .collect();
        assert_eq!(ids, vec![b"cred-1".to_vec(), b"cred-2".to_vec(), b"cred-3".to_vec()]);

        assert!(store.list(b"nobody").is_empty());
    }

    #[test]
    fn test_counter_monotonicity() {
        let store = CredentialStore::new();
        let alice = store.resolve_or_create_user("alice");
        store.add(alice.handle(), b"cred-1", b"key", 0).unwrap();

        // Stored zero is "no counter support": any value is accepted.
        assert_eq!(store.update_counter(b"cred-1", 5).unwrap(), 5);

        // From a nonzero stored counter, equal or lower values are regressions.
        let err = store.update_counter(b"cred-1", 5).unwrap_err();
        assert_eq!(
            err,
            CeremonyError::CounterRegression {
                stored: 5,
                reported: 5
            }
        );
        let err = store.update_counter(b"cred-1", 4).unwrap_err();
        assert!(matches!(err, CeremonyError::CounterRegression { .. }));

        // A reported zero after counting started is a regression too.
        let err = store.update_counter(b"cred-1", 0).unwrap_err();
        assert!(matches!(err, CeremonyError::CounterRegression { .. }));

        assert_eq!(store.update_counter(b"cred-1", 6).unwrap(), 6);
        assert_eq!(store.find(b"cred-1").unwrap().sign_count(), 6);
    }

    #[test]
    fn test_zero_counter_stays_exempt() {
        let store = CredentialStore::new();
        let alice = store.resolve_or_create_user("alice");
        store.add(alice.handle(), b"cred-1", b"key", 0).unwrap();

        // Authenticators without counters report zero forever.
        assert_eq!(store.update_counter(b"cred-1", 0).unwrap(), 0);
        assert_eq!(store.update_counter(b"cred-1", 0).unwrap(), 0);
    }

    #[test]
    fn test_update_counter_unknown_credential() {
        let store = CredentialStore::new();
        let err = store.update_counter(b"missing", 1).unwrap_err();
        assert_eq!(err, CeremonyError::UnknownCredential);
    }
}
