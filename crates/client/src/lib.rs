//! Matzip client library.
//!
//! Everything a Matzip front end needs short of drawing pixels: persistence,
//! the signed-in session, the authoritative place store and the screen state
//! machine, tied together by [`state::App`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;

pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, Notice, NoticeLevel};
pub use navigation::{NavigationError, Navigator, Route, Screen};
pub use services::auth::{AuthClient, AuthError, AuthTokens, HttpAuthClient};
pub use session::{Bootstrap, MigrationPolicy, PlaceSource, Reconciled, SessionManager, reconcile};
pub use state::{App, AppOptions, AuthKind, AuthOutcome, AuthTicket, PendingAuth};
pub use storage::{
    FileStore, KeyValueStore, MemoryStore, PlaceStorage, ReadOutcome, Scope, StorageError, WriteOutcome,
};
pub use store::{CascadePolicy, Mutation, PersistReport, PlaceStore, StoreError};
