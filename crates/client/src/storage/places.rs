//! Scoped place lists and remembered-session slots.

use std::fmt;
use std::sync::Arc;

use matzip_core::{Identity, Place};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::{KeyValueStore, keys};

/// Namespace a place list is persisted under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Shared bucket, kept for data written before lists were per user.
    Global,
    /// One identity's list.
    User(Identity),
}

impl Scope {
    /// Storage key for this scope.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Global => keys::GLOBAL_PLACES.to_owned(),
            Self::User(identity) => format!("{}{}", keys::PLACES_PREFIX, identity.as_str()),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::User(identity) => write!(f, "user:{identity}"),
        }
    }
}

/// Result of reading a scope. Every variant other than `Loaded` means "empty".
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    /// Nothing stored under the key.
    Missing,
    /// Stored list decoded.
    Loaded(Vec<Place>),
    /// Stored value is not a valid place list.
    Corrupt(String),
    /// The backend could not be read.
    Unavailable(String),
}

impl ReadOutcome {
    /// The places read, empty unless `Loaded`.
    #[must_use]
    pub fn into_places(self) -> Vec<Place> {
        match self {
            Self::Loaded(places) => places,
            Self::Missing | Self::Corrupt(_) | Self::Unavailable(_) => Vec::new(),
        }
    }
}

/// Result of a best-effort write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Value stored.
    Written,
    /// Value not stored; in-memory state is unaffected.
    Failed {
        /// Key that was being written.
        key: String,
        /// Backend error message.
        reason: String,
    },
}

impl WriteOutcome {
    /// Whether the write reached storage.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }
}

/// Place persistence over a [`KeyValueStore`].
///
/// Cheap to clone; clones share the backend. Nothing here returns an error:
/// failures are logged and reported through [`ReadOutcome`] / [`WriteOutcome`]
/// so a broken disk never takes the running session down.
#[derive(Clone)]
pub struct PlaceStorage {
    backend: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for PlaceStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceStorage").finish_non_exhaustive()
    }
}

impl PlaceStorage {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read the place list stored under `scope`.
    pub fn read_scoped(&self, scope: &Scope) -> ReadOutcome {
        let key = scope.key();
        let raw = match self.backend.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ReadOutcome::Missing,
            Err(e) => {
                warn!(scope = %scope, error = %e, "Failed to read places; treating as empty");
                return ReadOutcome::Unavailable(e.to_string());
            }
        };

        match serde_json::from_str::<Vec<Place>>(&raw) {
            Ok(places) => {
                debug!(scope = %scope, count = places.len(), "Loaded places");
                ReadOutcome::Loaded(places)
            }
            Err(e) => {
                warn!(scope = %scope, error = %e, "Stored places are malformed; treating as empty");
                ReadOutcome::Corrupt(e.to_string())
            }
        }
    }

    /// Write the full place list under `scope`.
    pub fn write_scoped(&self, scope: &Scope, places: &[Place]) -> WriteOutcome {
        let key = scope.key();
        let raw = match serde_json::to_string(places) {
            Ok(raw) => raw,
            Err(e) => return self.failed(key, &e),
        };
        match self.backend.set(&key, &raw) {
            Ok(()) => {
                debug!(scope = %scope, count = places.len(), "Persisted places");
                WriteOutcome::Written
            }
            Err(e) => self.failed(key, &e),
        }
    }

    /// The identity that last signed in, if one is remembered and still valid.
    #[must_use]
    pub fn remembered_identity(&self) -> Option<Identity> {
        let raw = self.read_slot(keys::LAST_USER_EMAIL)?;
        match Identity::normalize(&raw) {
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(error = %e, "Ignoring invalid remembered identity");
                None
            }
        }
    }

    /// Remember the identity for the next bootstrap.
    pub fn remember_identity(&self, identity: &Identity) -> WriteOutcome {
        self.write_slot(keys::LAST_USER_EMAIL, identity.as_str())
    }

    /// The stored access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.read_slot(keys::ACCESS_TOKEN)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    /// The stored refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.read_slot(keys::REFRESH_TOKEN)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    /// Store credential tokens verbatim. A missing refresh token clears the
    /// slot so an earlier one never outlives its access token.
    pub fn remember_tokens(
        &self,
        access: &SecretString,
        refresh: Option<&SecretString>,
    ) -> Vec<WriteOutcome> {
        let refresh = match refresh {
            Some(refresh) => self.write_slot(keys::REFRESH_TOKEN, refresh.expose_secret()),
            None => self.remove_slot(keys::REFRESH_TOKEN),
        };
        vec![
            self.write_slot(keys::ACCESS_TOKEN, access.expose_secret()),
            refresh,
        ]
    }

    /// Drop both tokens, keeping the remembered identity.
    pub fn forget_tokens(&self) -> Vec<WriteOutcome> {
        [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN]
            .into_iter()
            .map(|key| self.remove_slot(key))
            .collect()
    }

    /// Drop the remembered identity and both tokens. Place lists are kept.
    pub fn forget_session(&self) -> Vec<WriteOutcome> {
        [keys::LAST_USER_EMAIL, keys::ACCESS_TOKEN, keys::REFRESH_TOKEN]
            .into_iter()
            .map(|key| self.remove_slot(key))
            .collect()
    }

    fn read_slot(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read session slot");
                None
            }
        }
    }

    fn remove_slot(&self, key: &str) -> WriteOutcome {
        match self.backend.remove(key) {
            Ok(()) => WriteOutcome::Written,
            Err(e) => self.failed(key.to_owned(), &e),
        }
    }

    fn write_slot(&self, key: &str, value: &str) -> WriteOutcome {
        match self.backend.set(key, value) {
            Ok(()) => WriteOutcome::Written,
            Err(e) => self.failed(key.to_owned(), &e),
        }
    }

    #[allow(clippy::unused_self)]
    fn failed(&self, key: String, error: &dyn std::error::Error) -> WriteOutcome {
        warn!(key = %key, error = %error, "Storage write failed; keeping in-memory state");
        WriteOutcome::Failed {
            key,
            reason: error.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use matzip_core::{Category, PlaceId, Rating};

    use super::*;
    use crate::storage::MemoryStore;

    fn place(id: &str) -> Place {
        Place {
            id: PlaceId::new(id),
            name: format!("Place {id}"),
            visit_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            rating: Rating::new(3).unwrap(),
            category: Category::Green,
            photo_refs: Vec::new(),
            lat: 37.0,
            lng: 127.0,
            is_favorite: false,
            is_wishlist: false,
            memo: None,
            address: None,
        }
    }

    fn storage() -> (Arc<MemoryStore>, PlaceStorage) {
        let backend = Arc::new(MemoryStore::new());
        let storage = PlaceStorage::new(backend.clone());
        (backend, storage)
    }

    #[test]
    fn test_scope_keys() {
        let id = Identity::normalize("X@Y.com").unwrap();
        assert_eq!(Scope::Global.key(), "matzip_places_global");
        assert_eq!(Scope::User(id).key(), "matzip_places_x@y.com");
    }

    #[test]
    fn test_scope_key_is_case_and_whitespace_invariant() {
        let a = Scope::User(Identity::normalize(" A@B.com ").unwrap());
        let b = Scope::User(Identity::normalize("a@b.com").unwrap());
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_read_missing_is_empty() {
        let (_, storage) = storage();
        let outcome = storage.read_scoped(&Scope::Global);
        assert_eq!(outcome, ReadOutcome::Missing);
        assert!(outcome.into_places().is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let (_, storage) = storage();
        let places = vec![place("1"), place("2")];
        assert!(storage.write_scoped(&Scope::Global, &places).is_written());
        assert_eq!(storage.read_scoped(&Scope::Global), ReadOutcome::Loaded(places));
    }

    #[test]
    fn test_read_malformed_is_corrupt_and_empty() {
        let (backend, storage) = storage();
        backend.set(keys::GLOBAL_PLACES, "{not json").unwrap();
        let outcome = storage.read_scoped(&Scope::Global);
        assert!(matches!(outcome, ReadOutcome::Corrupt(_)));
        assert!(outcome.into_places().is_empty());
    }

    #[test]
    fn test_write_failure_is_reported_not_raised() {
        let storage = PlaceStorage::new(Arc::new(MemoryStore::with_quota(16)));
        let outcome = storage.write_scoped(&Scope::Global, &[place("1")]);
        assert!(matches!(outcome, WriteOutcome::Failed { ref key, .. } if key == "matzip_places_global"));
    }

    #[test]
    fn test_identity_slot() {
        let (backend, storage) = storage();
        assert!(storage.remembered_identity().is_none());

        let id = Identity::normalize("me@example.com").unwrap();
        storage.remember_identity(&id);
        assert_eq!(storage.remembered_identity(), Some(id));

        backend.set(keys::LAST_USER_EMAIL, "garbage").unwrap();
        assert!(storage.remembered_identity().is_none());
    }

    #[test]
    fn test_token_slots_and_forget() {
        let (_, storage) = storage();
        storage.remember_tokens(
            &SecretString::from("access-1"),
            Some(&SecretString::from("refresh-1")),
        );
        storage.remember_identity(&Identity::normalize("me@example.com").unwrap());
        storage.write_scoped(&Scope::Global, &[place("1")]);

        assert_eq!(storage.access_token().unwrap().expose_secret(), "access-1");
        assert_eq!(storage.refresh_token().unwrap().expose_secret(), "refresh-1");

        let outcomes = storage.forget_session();
        assert!(outcomes.iter().all(WriteOutcome::is_written));
        assert!(storage.access_token().is_none());
        assert!(storage.refresh_token().is_none());
        assert!(storage.remembered_identity().is_none());
        assert_eq!(storage.read_scoped(&Scope::Global).into_places().len(), 1);
    }

    #[test]
    fn test_missing_refresh_token_clears_previous_one() {
        let (_, storage) = storage();
        storage.remember_tokens(
            &SecretString::from("access-a"),
            Some(&SecretString::from("refresh-a")),
        );
        storage.remember_tokens(&SecretString::from("access-b"), None);

        assert_eq!(storage.access_token().unwrap().expose_secret(), "access-b");
        assert!(storage.refresh_token().is_none());

        storage.remember_identity(&Identity::normalize("b@example.com").unwrap());
        let outcomes = storage.forget_tokens();
        assert!(outcomes.iter().all(WriteOutcome::is_written));
        assert!(storage.access_token().is_none());
        assert!(storage.remembered_identity().is_some());
    }
}
