//! Application controller.
//!
//! [`App`] is the single owner of session, store and navigation state. All
//! mutation goes through `&mut self`; the only suspension point is the call
//! to the authentication service, which is split into
//! [`App::begin_auth`] / [`App::request`] / [`App::complete_auth`] so a UI can
//! keep running while a request is in flight. Responses that arrive after a
//! newer attempt, or after the user navigated away, are dropped.

use std::collections::VecDeque;
use std::time::Duration;

use matzip_core::views::Filters;
use matzip_core::{Collection, CollectionId, DraftCollection, Identity, NewPlace, Place, PlaceId};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{self, ClientError, Notice};
use crate::models::{Session, UserProfile, session::DEFAULT_BIO};
use crate::navigation::{NavigationError, Navigator, Route, Screen};
use crate::services::auth::{AuthClient, AuthError, AuthTokens};
use crate::session::{Bootstrap, MigrationPolicy, PlaceSource, SessionManager};
use crate::storage::PlaceStorage;
use crate::store::{CascadePolicy, Mutation, PlaceStore, StoreError};

const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for an [`App`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppOptions {
    pub migration: MigrationPolicy,
    pub cascade: CascadePolicy,
    pub auth_timeout: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            migration: MigrationPolicy::default(),
            cascade: CascadePolicy::default(),
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }
}

impl From<&ClientConfig> for AppOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            migration: config.migration,
            cascade: config.cascade,
            auth_timeout: config.auth_timeout,
        }
    }
}

/// What an authentication attempt is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthKind {
    SignIn,
    SignUp { display_name: String },
}

/// Identifies one authentication attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTicket {
    seq: u64,
    epoch: u64,
}

/// An attempt that has been issued but not yet applied.
#[derive(Debug)]
pub struct PendingAuth {
    ticket: AuthTicket,
    identity: Identity,
    password: SecretString,
    kind: AuthKind,
}

impl PendingAuth {
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }
}

/// Raw result of the remote call. Sign-up never yields tokens.
pub type AuthResponse = Result<Option<AuthTokens>, AuthError>;

/// How [`App::complete_auth`] handled a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Session established; data came from this source.
    Applied(PlaceSource),
    /// Remote call failed; an error notice was queued and nothing changed.
    Failed,
    /// Superseded by a newer attempt or a navigation; ignored.
    Stale,
}

/// Session, store and navigation for one running client.
pub struct App<A> {
    auth: A,
    sessions: SessionManager,
    store: PlaceStore,
    nav: Navigator,
    notices: VecDeque<Notice>,
    auth_seq: u64,
    auth_timeout: Duration,
}

impl<A> std::fmt::Debug for App<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("session", &self.sessions.session())
            .field("screen", &self.nav.route())
            .field("places", &self.store.places().len())
            .finish_non_exhaustive()
    }
}

impl<A: AuthClient> App<A> {
    #[must_use]
    pub fn new(auth: A, storage: PlaceStorage, options: AppOptions) -> Self {
        Self {
            auth,
            sessions: SessionManager::new(storage.clone(), options.migration),
            store: PlaceStore::new(storage, options.cascade),
            nav: Navigator::new(),
            notices: VecDeque::new(),
            auth_seq: 0,
            auth_timeout: options.auth_timeout,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn screen(&self) -> &Screen {
        self.nav.screen()
    }

    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.nav
    }

    #[must_use]
    pub const fn store(&self) -> &PlaceStore {
        &self.store
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.sessions.session()
    }

    #[must_use]
    pub const fn filters(&self) -> &Filters {
        self.nav.filters()
    }

    pub const fn filters_mut(&mut self) -> &mut Filters {
        self.nav.filters_mut()
    }

    /// Queued notices, oldest first.
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Drain queued notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Restore a remembered session or start at login.
    pub fn bootstrap(&mut self) -> Bootstrap {
        let outcome = self.sessions.bootstrap(&mut self.store);
        match &outcome {
            Bootstrap::Restored { identity, .. } => {
                error::set_sentry_user(identity.as_str());
                self.nav.signed_in();
            }
            Bootstrap::SignedOut => self.nav.signed_out(),
        }
        outcome
    }

    /// Validate input and issue a ticket for a new attempt.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Identity` if the email is invalid; an error
    /// notice is queued as well.
    pub fn begin_auth(
        &mut self,
        email: &str,
        password: SecretString,
        kind: AuthKind,
    ) -> Result<PendingAuth, ClientError> {
        let identity = match Identity::normalize(email) {
            Ok(identity) => identity,
            Err(e) => {
                self.notices
                    .push_back(Notice::error(AuthError::from(e.clone()).user_message()));
                return Err(e.into());
            }
        };

        self.auth_seq += 1;
        let ticket = AuthTicket {
            seq: self.auth_seq,
            epoch: self.nav.epoch(),
        };
        debug!(identity = %identity, seq = ticket.seq, ?kind, "Auth attempt issued");
        error::add_breadcrumb("auth", "Auth attempt issued", Some(&[("email", identity.as_str())]));

        Ok(PendingAuth {
            ticket,
            identity,
            password,
            kind,
        })
    }

    /// Call the authentication service for a pending attempt, bounded by the
    /// configured timeout.
    pub async fn request(&self, pending: &PendingAuth) -> AuthResponse {
        let email = pending.identity.as_str();
        let call = async {
            match pending.kind {
                AuthKind::SignIn => self.auth.sign_in(email, &pending.password).await.map(Some),
                AuthKind::SignUp { .. } => self.auth.sign_up(email, &pending.password).await.map(|()| None),
            }
        };
        tokio::time::timeout(self.auth_timeout, call)
            .await
            .unwrap_or(Err(AuthError::Timeout))
    }

    /// Apply a response if its attempt is still current.
    pub fn complete_auth(&mut self, pending: PendingAuth, response: AuthResponse) -> AuthOutcome {
        if pending.ticket.seq != self.auth_seq || pending.ticket.epoch != self.nav.epoch() {
            debug!(
                seq = pending.ticket.seq,
                latest = self.auth_seq,
                "Ignoring stale auth response"
            );
            return AuthOutcome::Stale;
        }

        let tokens = match response {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(identity = %pending.identity, error = %e, "Authentication failed");
                error::add_breadcrumb("auth", "Authentication failed", None);
                self.notices.push_back(Notice::error(e.user_message()));
                return AuthOutcome::Failed;
            }
        };

        let (profile, greeting) = match &pending.kind {
            AuthKind::SignIn => (
                UserProfile::for_identity(&pending.identity, DEFAULT_BIO),
                "Signed in.",
            ),
            AuthKind::SignUp { display_name } => (
                UserProfile::with_display_name(&pending.identity, display_name),
                "Welcome! Your account is ready.",
            ),
        };

        let session = Session::authenticated(pending.identity.clone(), profile, pending.password);
        let established = self
            .sessions
            .establish(&mut self.store, session, tokens.as_ref());

        info!(identity = %pending.identity, source = ?established.source, "Authenticated");
        error::set_sentry_user(pending.identity.as_str());
        self.nav.signed_in();
        self.notices.push_back(Notice::success(greeting));

        AuthOutcome::Applied(established.source)
    }

    /// Sign in and apply the result.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Identity` if the email is invalid.
    pub async fn sign_in(&mut self, email: &str, password: SecretString) -> Result<AuthOutcome, ClientError> {
        let pending = self.begin_auth(email, password, AuthKind::SignIn)?;
        let response = self.request(&pending).await;
        Ok(self.complete_auth(pending, response))
    }

    /// Register and apply the result.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Identity` if the email is invalid.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: SecretString,
        display_name: &str,
    ) -> Result<AuthOutcome, ClientError> {
        let kind = AuthKind::SignUp {
            display_name: display_name.to_owned(),
        };
        let pending = self.begin_auth(email, password, kind)?;
        let response = self.request(&pending).await;
        Ok(self.complete_auth(pending, response))
    }

    /// End the session and return to login.
    pub fn sign_out(&mut self) {
        self.sessions.end(&mut self.store);
        // Any in-flight attempt now belongs to a different screen.
        self.auth_seq += 1;
        error::clear_sentry_user();
        error::add_breadcrumb("auth", "Signed out", None);
        self.nav.signed_out();
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Go to a payload-free screen.
    ///
    /// # Errors
    ///
    /// See [`Navigator::navigate`].
    pub fn navigate(&mut self, route: Route) -> Result<(), NavigationError> {
        let leaving_wizard = self.nav.route() == Route::CollectionAddPlaces;
        self.nav.navigate(route)?;
        if leaving_wizard && self.store.discard_draft().is_some() {
            debug!("Collection draft discarded");
        }
        error::add_breadcrumb("navigation", route.as_str(), None);
        Ok(())
    }

    /// Show a stored place in detail.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PlaceNotFound` for unknown IDs, or a navigation
    /// error without a session.
    pub fn view_detail(&mut self, id: &PlaceId) -> Result<(), ClientError> {
        let place = self.find_place(id)?;
        self.nav.view_detail(place)?;
        error::add_breadcrumb("navigation", "detail", Some(&[("place_id", id.as_str())]));
        Ok(())
    }

    /// Show the map centered on a stored place.
    ///
    /// # Errors
    ///
    /// Same as [`App::view_detail`].
    pub fn view_on_map(&mut self, id: &PlaceId) -> Result<(), ClientError> {
        let place = self.find_place(id)?;
        self.nav.view_on_map(place)?;
        Ok(())
    }

    /// Show a collection.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::MissingSelection` for unknown IDs.
    pub fn view_collection(&mut self, id: &CollectionId) -> Result<(), ClientError> {
        let collection = self
            .store
            .collection(id)
            .cloned()
            .ok_or(NavigationError::MissingSelection(Route::CollectionDetail))?;
        self.nav.view_collection(collection)?;
        Ok(())
    }

    /// Check the re-entered password. Returns whether it matched.
    ///
    /// A match opens the profile editor; a mismatch stays on password entry
    /// with an inline error.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Unauthenticated` without a session, or
    /// `NavigationError::WrongScreen` unless password entry is showing.
    pub fn verify_password(&mut self, input: &str) -> Result<bool, NavigationError> {
        let session = self.sessions.session().ok_or(NavigationError::Unauthenticated)?;
        if self.nav.route() != Route::PasswordVerify {
            return Err(NavigationError::WrongScreen(Route::PasswordVerify));
        }
        if session.verify(input) {
            self.nav.verified();
            Ok(true)
        } else {
            self.nav.verification_failed("Password does not match.");
            Ok(false)
        }
    }

    /// Save profile edits and return to the profile page.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::VerificationRequired` unless the profile
    /// editor is open.
    pub fn update_profile(&mut self, nickname: &str, bio: &str) -> Result<&UserProfile, NavigationError> {
        if self.nav.route() != Route::ProfileEdit {
            return Err(NavigationError::VerificationRequired);
        }
        self.sessions
            .update_profile(nickname, bio)
            .ok_or(NavigationError::Unauthenticated)?;
        self.nav.land(Screen::MyPage)?;
        self.sessions
            .session()
            .map(Session::profile)
            .ok_or(NavigationError::Unauthenticated)
    }

    // =========================================================================
    // Places
    // =========================================================================

    /// Record a new visit. From map search, lands on the map focused on it.
    ///
    /// # Errors
    ///
    /// Returns a navigation error without a session, or a store error if the
    /// place is invalid.
    pub fn add_place(&mut self, new: NewPlace) -> Result<Mutation<Place>, ClientError> {
        self.require_session()?;
        let added = self.store.add_place(new)?;
        if self.nav.route() == Route::MapSearch {
            self.nav.land(Screen::Map {
                focus: Some(added.value.clone()),
            })?;
        }
        Ok(added)
    }

    /// Save a place to the wishlist. From wishlist search, lands on the wishlist.
    ///
    /// # Errors
    ///
    /// Same as [`App::add_place`].
    pub fn add_wishlist_place(&mut self, new: NewPlace) -> Result<Mutation<Place>, ClientError> {
        self.require_session()?;
        let added = self.store.add_wishlist_place(new)?;
        if self.nav.route() == Route::WishlistSearch {
            self.nav.land(Screen::Wishlist)?;
        }
        Ok(added)
    }

    /// Replace a place and return to the feed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PlaceNotFound` or `StoreError::Invalid`.
    pub fn update_place(&mut self, place: Place) -> Result<Mutation<()>, ClientError> {
        self.require_session()?;
        let updated = self.store.update_place(place)?;
        self.nav.land(Screen::Feed)?;
        Ok(updated)
    }

    /// Delete a place and return to the feed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PlaceNotFound`.
    pub fn delete_place(&mut self, id: &PlaceId) -> Result<Mutation<Place>, ClientError> {
        self.require_session()?;
        let deleted = self.store.delete_place(id)?;
        self.nav.land(Screen::Feed)?;
        Ok(deleted)
    }

    /// Flip the favorite facet, keeping any open detail view current.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PlaceNotFound`.
    pub fn toggle_favorite(&mut self, id: &PlaceId) -> Result<Mutation<bool>, ClientError> {
        self.require_session()?;
        let toggled = self.store.toggle_favorite(id)?;
        self.refresh_selection(id);
        Ok(toggled)
    }

    /// Flip the wishlist facet, keeping any open detail view current.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PlaceNotFound`.
    pub fn toggle_wishlist(&mut self, id: &PlaceId) -> Result<Mutation<bool>, ClientError> {
        self.require_session()?;
        let toggled = self.store.toggle_wishlist(id)?;
        self.refresh_selection(id);
        Ok(toggled)
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Start the collection wizard and move to place selection.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Unauthenticated` without a session.
    pub fn create_collection(&mut self, name: &str, description: &str) -> Result<DraftCollection, ClientError> {
        self.require_session()?;
        let draft = self.store.create_collection(name, description).clone();
        self.nav.pick_collection_places(draft.clone())?;
        Ok(draft)
    }

    /// Finish the wizard and land on the profile page. Without a pending
    /// draft this is a no-op returning `None`.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Unauthenticated` without a session.
    pub fn commit_collection(&mut self, place_ids: Vec<PlaceId>) -> Result<Option<Collection>, ClientError> {
        self.require_session()?;
        let Some(collection) = self.store.commit_collection(place_ids).cloned() else {
            return Ok(None);
        };
        self.nav.land(Screen::MyPage)?;
        Ok(Some(collection))
    }

    /// Delete a collection and land on the profile page.
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::Unauthenticated` without a session.
    pub fn delete_collection(&mut self, id: &CollectionId) -> Result<Option<Collection>, ClientError> {
        self.require_session()?;
        let removed = self.store.delete_collection(id);
        self.nav.land(Screen::MyPage)?;
        Ok(removed)
    }

    fn find_place(&self, id: &PlaceId) -> Result<Place, StoreError> {
        self.store
            .place(id)
            .cloned()
            .ok_or_else(|| StoreError::PlaceNotFound(id.clone()))
    }

    fn refresh_selection(&mut self, id: &PlaceId) {
        if let Some(place) = self.store.place(id) {
            self.nav.refresh_selection(place);
        }
    }

    fn require_session(&self) -> Result<(), NavigationError> {
        if self.sessions.session().is_some() {
            Ok(())
        } else {
            Err(NavigationError::Unauthenticated)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use matzip_core::{Category, Rating};

    use super::*;
    use crate::storage::MemoryStore;

    /// Accepts one fixed password; records calls.
    #[derive(Default)]
    struct FakeAuth {
        calls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl AuthClient for FakeAuth {
        async fn sign_in(&self, email: &str, password: &SecretString) -> Result<AuthTokens, AuthError> {
            use secrecy::ExposeSecret;
            self.calls.lock().unwrap().push(format!("signin:{email}"));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if password.expose_secret() == "right" {
                Ok(AuthTokens {
                    access_token: SecretString::from("a"),
                    refresh_token: None,
                })
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }

        async fn sign_up(&self, email: &str, _password: &SecretString) -> Result<(), AuthError> {
            self.calls.lock().unwrap().push(format!("signup:{email}"));
            Ok(())
        }
    }

    fn app() -> App<FakeAuth> {
        App::new(
            FakeAuth::default(),
            PlaceStorage::new(Arc::new(MemoryStore::new())),
            AppOptions::default(),
        )
    }

    fn new_place(name: &str) -> NewPlace {
        NewPlace {
            id: None,
            name: name.to_string(),
            visit_date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            rating: Rating::new(4).unwrap(),
            category: Category::Red,
            photo_refs: Vec::new(),
            lat: 37.5,
            lng: 127.0,
            is_favorite: false,
            is_wishlist: false,
            memo: None,
            address: None,
        }
    }

    async fn signed_in() -> App<FakeAuth> {
        let mut app = app();
        app.bootstrap();
        let outcome = app.sign_in("me@example.com", SecretString::from("right")).await.unwrap();
        assert!(matches!(outcome, AuthOutcome::Applied(_)));
        app
    }

    #[tokio::test]
    async fn test_sign_in_lands_on_map() {
        let mut app = signed_in().await;
        assert_eq!(app.screen(), &Screen::Map { focus: None });
        assert_eq!(app.session().unwrap().identity().as_str(), "me@example.com");
        let notices = app.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, crate::error::NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_failed_sign_in_changes_nothing() {
        let mut app = app();
        app.bootstrap();
        let outcome = app.sign_in("me@example.com", SecretString::from("wrong")).await.unwrap();
        assert_eq!(outcome, AuthOutcome::Failed);
        assert!(app.session().is_none());
        assert_eq!(app.screen(), &Screen::Login);
        assert_eq!(app.take_notices()[0].level, crate::error::NoticeLevel::Error);
    }

    #[tokio::test]
    async fn test_invalid_email_never_calls_service() {
        let mut app = app();
        let err = app.sign_in("not-an-email", SecretString::from("right")).await.unwrap_err();
        assert!(matches!(err, ClientError::Identity(_)));
        assert!(app.auth.calls.lock().unwrap().is_empty());
        assert_eq!(app.notices().count(), 1);
    }

    #[tokio::test]
    async fn test_superseded_attempt_is_stale() {
        let mut app = app();
        app.bootstrap();
        let first = app.begin_auth("a@b.com", SecretString::from("right"), AuthKind::SignIn).unwrap();
        let first_response = app.request(&first).await;
        let second = app.begin_auth("c@d.com", SecretString::from("wrong"), AuthKind::SignIn).unwrap();

        assert_eq!(app.complete_auth(first, first_response), AuthOutcome::Stale);
        assert!(app.session().is_none());

        let second_response = app.request(&second).await;
        assert_eq!(app.complete_auth(second, second_response), AuthOutcome::Failed);
    }

    #[tokio::test]
    async fn test_navigating_away_makes_attempt_stale() {
        let mut app = app();
        app.bootstrap();
        let pending = app.begin_auth("a@b.com", SecretString::from("right"), AuthKind::SignIn).unwrap();
        let response = app.request(&pending).await;
        app.navigate(Route::Signup).unwrap();
        assert_eq!(app.complete_auth(pending, response), AuthOutcome::Stale);
        assert_eq!(app.screen(), &Screen::Signup);
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let mut app = App::new(
            FakeAuth {
                delay: Some(Duration::from_secs(60)),
                ..FakeAuth::default()
            },
            PlaceStorage::new(Arc::new(MemoryStore::new())),
            AppOptions {
                auth_timeout: Duration::from_millis(50),
                ..AppOptions::default()
            },
        );
        app.bootstrap();
        let outcome = app.sign_in("a@b.com", SecretString::from("right")).await.unwrap();
        assert_eq!(outcome, AuthOutcome::Failed);
        assert_eq!(
            app.take_notices()[0].message,
            AuthError::Timeout.user_message()
        );
    }

    #[tokio::test]
    async fn test_sign_up_uses_display_name() {
        let mut app = app();
        app.bootstrap();
        let outcome = app
            .sign_up("new@example.com", SecretString::from("pw"), "Minji")
            .await
            .unwrap();
        assert_eq!(outcome, AuthOutcome::Applied(PlaceSource::Empty));
        assert_eq!(app.session().unwrap().profile().nickname, "Minji");
        assert_eq!(app.session().unwrap().profile().bio, "");
    }

    #[tokio::test]
    async fn test_password_verify_flow() {
        let mut app = signed_in().await;
        app.navigate(Route::MyPage).unwrap();
        app.navigate(Route::PasswordVerify).unwrap();

        assert!(!app.verify_password("nope").unwrap());
        assert!(matches!(app.screen(), Screen::PasswordVerify { error: Some(_) }));
        assert_eq!(
            app.update_profile("x", "y").unwrap_err(),
            NavigationError::VerificationRequired
        );

        assert!(app.verify_password("right").unwrap());
        assert_eq!(app.screen(), &Screen::ProfileEdit);
        let profile = app.update_profile("Minji", "Spicy food only").unwrap();
        assert_eq!(profile.bio, "Spicy food only");
        assert_eq!(app.screen(), &Screen::MyPage);
    }

    #[tokio::test]
    async fn test_verify_password_only_from_password_entry() {
        let mut app = signed_in().await;
        app.navigate(Route::Feed).unwrap();

        assert_eq!(
            app.verify_password("right").unwrap_err(),
            NavigationError::WrongScreen(Route::PasswordVerify)
        );
        assert_eq!(app.screen(), &Screen::Feed);

        app.navigate(Route::Map).unwrap();
        assert!(app.verify_password("right").is_err());
        assert_ne!(app.screen(), &Screen::ProfileEdit);
    }

    #[tokio::test]
    async fn test_place_mutations_navigate() {
        let mut app = signed_in().await;
        app.navigate(Route::MapSearch).unwrap();
        let place = app.add_place(new_place("Kimchi House")).unwrap().value;
        assert_eq!(app.screen().selected_place(), Some(&place));

        app.view_detail(&place.id).unwrap();
        assert!(app.toggle_favorite(&place.id).unwrap().value);
        assert!(app.screen().selected_place().unwrap().is_favorite);

        app.delete_place(&place.id).unwrap();
        assert_eq!(app.screen(), &Screen::Feed);
        assert!(matches!(
            app.view_detail(&place.id),
            Err(ClientError::Store(StoreError::PlaceNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_collection_wizard() {
        let mut app = signed_in().await;
        let a = app.add_place(new_place("A")).unwrap().value.id;

        app.navigate(Route::CollectionCreate).unwrap();
        let draft = app.create_collection("Date Spots", "").unwrap();
        assert_eq!(app.screen(), &Screen::CollectionAddPlaces(draft));

        app.navigate(Route::Feed).unwrap();
        assert!(app.store().draft().is_none());
        assert!(app.commit_collection(vec![a.clone()]).unwrap().is_none());

        app.navigate(Route::CollectionCreate).unwrap();
        app.create_collection("Date Spots", "").unwrap();
        let collection = app.commit_collection(vec![a]).unwrap().unwrap();
        assert_eq!(app.screen(), &Screen::MyPage);
        assert!(app.commit_collection(Vec::new()).unwrap().is_none());

        app.view_collection(&collection.id).unwrap();
        app.delete_collection(&collection.id).unwrap();
        assert_eq!(app.screen(), &Screen::MyPage);
        assert!(app.store().collections().is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_locks_everything() {
        let mut app = signed_in().await;
        app.add_place(new_place("A")).unwrap();
        app.sign_out();
        assert_eq!(app.screen(), &Screen::Login);
        assert!(app.store().places().is_empty());
        assert!(matches!(
            app.add_place(new_place("B")),
            Err(ClientError::Navigation(NavigationError::Unauthenticated))
        ));
        assert_eq!(app.verify_password("right"), Err(NavigationError::Unauthenticated));
    }
}
