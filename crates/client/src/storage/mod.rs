//! Persistence Adapter.
//!
//! Durable storage is a flat string key-value space, the same shape as the
//! browser local storage earlier clients used. Two backends are provided:
//!
//! - [`FileStore`] - one file per key under a data directory
//! - [`MemoryStore`] - in-process map, optionally with a byte quota
//!
//! [`PlaceStorage`] layers scoped place lists and the remembered-session
//! slots on top of any backend. It never returns errors to callers: reads
//! degrade to an empty list and writes report a [`WriteOutcome`].
//!
//! # Keys
//!
//! | Key | Contents |
//! |---|---|
//! | `matzip_places_global` | place list shared by every identity |
//! | `matzip_places_<identity>` | place list of one identity |
//! | `matzip_last_user_email` | remembered identity |
//! | `accessToken` / `refreshToken` | opaque credential tokens |
//!
//! Two processes writing the same key race; the last write wins.

mod file;
mod memory;
mod places;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use places::{PlaceStorage, ReadOutcome, Scope, WriteOutcome};

use thiserror::Error;

/// Storage keys.
pub mod keys {
    /// Prefix of per-identity place lists.
    pub const PLACES_PREFIX: &str = "matzip_places_";

    /// Place list shared across identities.
    pub const GLOBAL_PLACES: &str = "matzip_places_global";

    /// Last identity that signed in.
    pub const LAST_USER_EMAIL: &str = "matzip_last_user_email";

    /// Access token returned by sign-in.
    pub const ACCESS_TOKEN: &str = "accessToken";

    /// Refresh token returned by sign-in.
    pub const REFRESH_TOKEN: &str = "refreshToken";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("storage I/O error on {key}: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the value would exceed the backend's capacity.
    #[error("storage quota exceeded writing {key} ({needed} bytes, {available} available)")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Bytes the write needed.
        needed: usize,
        /// Bytes still free.
        available: usize,
    },

    /// The backend cannot be used at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string key-value backend.
///
/// Implementations must be usable through a shared reference; the client is
/// single-threaded but hands the same backend to the session manager and the
/// store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value could not be stored.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend refused the removal.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
