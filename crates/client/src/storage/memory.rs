//! In-process storage backend.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{KeyValueStore, StorageError};

/// A [`KeyValueStore`] kept in memory.
///
/// An optional quota caps the total bytes of keys plus values, mimicking a
/// browser storage area that rejects writes once full.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects writes beyond `bytes` total.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::default(),
            quota: Some(bytes),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();

        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            let available = quota.saturating_sub(used);
            if needed > available {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    needed,
                    available,
                });
            }
        }

        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));

        store.remove("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        store.remove("k").unwrap();
    }

    #[test]
    fn test_quota_rejects_oversized_write_and_keeps_old_value() {
        let store = MemoryStore::with_quota(10);
        store.set("k", "short").unwrap();

        let err = store.set("k", "much too long").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_quota_counts_replacement_not_addition() {
        let store = MemoryStore::with_quota(6);
        store.set("k", "12345").unwrap();
        // Replacing the same key frees its old bytes first.
        store.set("k", "54321").unwrap();
        assert_eq!(store.len(), 1);
    }
}
