//! Session manager.
//!
//! Owns the signed-in identity and is the only code that reseeds the
//! [`PlaceStore`]. Which stored list a session starts from is decided by
//! [`reconcile`], a pure function over what was read from each scope.

use std::fmt;
use std::str::FromStr;

use matzip_core::{Identity, Place};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::{Session, UserProfile};
use crate::services::auth::AuthTokens;
use crate::storage::{PlaceStorage, Scope};
use crate::store::{PersistReport, PlaceStore};

/// Whether data in the global scope is adopted by an identity that has none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MigrationPolicy {
    /// Fall back to the global list when the identity's own list is empty.
    #[default]
    GlobalFallback,
    /// Only ever load the identity's own list.
    PerUserOnly,
}

impl MigrationPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GlobalFallback => "global-fallback",
            Self::PerUserOnly => "per-user-only",
        }
    }
}

impl fmt::Display for MigrationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MigrationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global-fallback" => Ok(Self::GlobalFallback),
            "per-user-only" => Ok(Self::PerUserOnly),
            other => Err(format!(
                "expected global-fallback or per-user-only, got '{other}'"
            )),
        }
    }
}

/// Which stored list a session started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceSource {
    PerUser,
    Global,
    Empty,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub places: Vec<Place>,
    pub source: PlaceSource,
}

/// Pick the starting list: per-user if non-empty, otherwise global if the
/// policy allows and it is non-empty, otherwise empty.
#[must_use]
pub fn reconcile(per_user: Vec<Place>, global: Vec<Place>, policy: MigrationPolicy) -> Reconciled {
    if !per_user.is_empty() {
        return Reconciled {
            places: per_user,
            source: PlaceSource::PerUser,
        };
    }
    if policy == MigrationPolicy::GlobalFallback && !global.is_empty() {
        return Reconciled {
            places: global,
            source: PlaceSource::Global,
        };
    }
    Reconciled {
        places: Vec::new(),
        source: PlaceSource::Empty,
    }
}

/// Result of bootstrapping from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    /// Remembered identity and token found; session restored.
    Restored { identity: Identity, source: PlaceSource },
    /// Nothing restorable; visitor starts signed out with no data.
    SignedOut,
}

/// Storage effects of starting a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Established {
    pub source: PlaceSource,
    pub persisted: PersistReport,
}

/// Tracks the current [`Session`] and keeps the store in step with it.
#[derive(Debug)]
pub struct SessionManager {
    storage: PlaceStorage,
    policy: MigrationPolicy,
    session: Option<Session>,
}

impl SessionManager {
    #[must_use]
    pub const fn new(storage: PlaceStorage, policy: MigrationPolicy) -> Self {
        Self {
            storage,
            policy,
            session: None,
        }
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn policy(&self) -> MigrationPolicy {
        self.policy
    }

    /// Restore a remembered session, or start signed out with an empty store.
    pub fn bootstrap(&mut self, store: &mut PlaceStore) -> Bootstrap {
        let identity = self.storage.remembered_identity();
        let has_token = self.storage.access_token().is_some();

        let Some(identity) = identity.filter(|_| has_token) else {
            info!("No restorable session");
            self.session = None;
            store.reseed(None, Vec::new());
            return Bootstrap::SignedOut;
        };

        let reconciled = self.load(&identity);
        info!(
            identity = %identity,
            source = ?reconciled.source,
            count = reconciled.places.len(),
            "Session restored"
        );
        store.reseed(Some(identity.clone()), reconciled.places);
        self.session = Some(Session::restored(identity.clone()));

        Bootstrap::Restored {
            identity,
            source: reconciled.source,
        }
    }

    /// Install a freshly authenticated session.
    ///
    /// Remembers the identity and any tokens, reconciles stored data, writes
    /// the result back to the identity's scope and the global scope, and
    /// reseeds the store.
    pub fn establish(
        &mut self,
        store: &mut PlaceStore,
        session: Session,
        tokens: Option<&AuthTokens>,
    ) -> Established {
        let identity = session.identity().clone();

        let remembered = self.storage.remember_identity(&identity).is_written();
        if !remembered {
            warn!(identity = %identity, "Identity not remembered; next start will ask to sign in");
        }
        // Tokens are only kept next to the identity they belong to.
        let tokens_kept = match tokens.filter(|_| remembered) {
            Some(tokens) => self
                .storage
                .remember_tokens(&tokens.access_token, tokens.refresh_token.as_ref()),
            None => self.storage.forget_tokens(),
        };
        if tokens_kept.iter().any(|o| !o.is_written()) {
            warn!(identity = %identity, "Token slots not updated");
        }

        let reconciled = self.load(&identity);
        let persisted = PersistReport {
            user: Some(
                self.storage
                    .write_scoped(&Scope::User(identity.clone()), &reconciled.places),
            ),
            global: self.storage.write_scoped(&Scope::Global, &reconciled.places),
        };

        info!(
            identity = %identity,
            source = ?reconciled.source,
            count = reconciled.places.len(),
            "Session established"
        );
        store.reseed(Some(identity), reconciled.places);
        self.session = Some(session);

        Established {
            source: reconciled.source,
            persisted,
        }
    }

    /// Forget the remembered session and clear the store. Stored place lists
    /// are left intact.
    pub fn end(&mut self, store: &mut PlaceStore) {
        if let Some(session) = self.session.take() {
            info!(identity = %session.identity(), "Session ended");
        }
        self.storage.forget_session();
        store.reseed(None, Vec::new());
    }

    /// Replace the profile of the active session.
    pub fn update_profile(&mut self, nickname: &str, bio: &str) -> Option<&UserProfile> {
        let session = self.session.as_mut()?;
        session.update_profile(nickname, bio);
        Some(session.profile())
    }

    fn load(&self, identity: &Identity) -> Reconciled {
        let per_user = self
            .storage
            .read_scoped(&Scope::User(identity.clone()))
            .into_places();
        let global = if self.policy == MigrationPolicy::GlobalFallback && per_user.is_empty() {
            self.storage.read_scoped(&Scope::Global).into_places()
        } else {
            Vec::new()
        };
        reconcile(per_user, global, self.policy)
    }
}
