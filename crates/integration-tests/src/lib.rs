//! Integration tests for Matzip.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p matzip-integration-tests
//! ```
//!
//! No external services are needed: authentication is either faked in
//! process ([`FakeAuth`]) or served by an in-process HTTP server
//! ([`MockAuthServer`]) on an ephemeral port.
//!
//! # Test Categories
//!
//! - `scenarios` - End-to-end session, store and navigation behavior
//! - `http_auth` - HTTP auth client contract and restart persistence

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use chrono::NaiveDate;
use matzip_client::{
    App, AppOptions, AuthClient, AuthError, AuthTokens, KeyValueStore, MemoryStore, PlaceStorage,
};
use matzip_core::{Category, NewPlace, Rating};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::task::JoinHandle;
use url::Url;

// =============================================================================
// In-process auth
// =============================================================================

#[derive(Debug, Default)]
struct FakeAuthState {
    accounts: HashMap<String, String>,
    calls: Vec<String>,
    offline: bool,
}

/// In-memory account service.
///
/// Clones share state, so a test can keep a handle after moving one into
/// an [`App`].
#[derive(Debug, Clone, Default)]
pub struct FakeAuth {
    state: Arc<Mutex<FakeAuthState>>,
}

impl FakeAuth {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account directly.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.lock()
            .accounts
            .insert(email.to_owned(), password.to_owned());
        self
    }

    /// Make every call fail with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Calls received so far, as `signin:<email>` / `signup:<email>`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, FakeAuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthClient for FakeAuth {
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<AuthTokens, AuthError> {
        let mut state = self.lock();
        state.calls.push(format!("signin:{email}"));
        if state.offline {
            return Err(AuthError::Network("offline".to_string()));
        }
        match state.accounts.get(email) {
            Some(stored) if stored == password.expose_secret() => Ok(AuthTokens {
                access_token: SecretString::from(format!("access-{email}")),
                refresh_token: Some(SecretString::from(format!("refresh-{email}"))),
            }),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<(), AuthError> {
        let mut state = self.lock();
        state.calls.push(format!("signup:{email}"));
        if state.offline {
            return Err(AuthError::Network("offline".to_string()));
        }
        if state.accounts.contains_key(email) {
            return Err(AuthError::AlreadyRegistered);
        }
        state
            .accounts
            .insert(email.to_owned(), password.expose_secret().to_owned());
        Ok(())
    }
}

/// An app over fresh in-memory storage.
pub struct TestContext {
    pub backend: Arc<MemoryStore>,
    pub auth: FakeAuth,
    pub app: App<FakeAuth>,
}

impl TestContext {
    #[must_use]
    pub fn new(auth: FakeAuth) -> Self {
        Self::with_backend(auth, Arc::new(MemoryStore::new()), AppOptions::default())
    }

    #[must_use]
    pub fn with_backend(auth: FakeAuth, backend: Arc<MemoryStore>, options: AppOptions) -> Self {
        let app = App::new(auth.clone(), PlaceStorage::new(backend.clone()), options);
        Self { backend, auth, app }
    }

    /// A second app over the same storage, as after a restart.
    #[must_use]
    pub fn restart(&self) -> App<FakeAuth> {
        App::new(
            self.auth.clone(),
            PlaceStorage::new(self.backend.clone()),
            AppOptions::default(),
        )
    }

    /// Raw value stored under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.backend.get(key).ok().flatten()
    }
}

/// A visit draft with sensible defaults.
#[must_use]
pub fn new_place(name: &str) -> NewPlace {
    NewPlace {
        id: None,
        name: name.to_owned(),
        visit_date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap_or_default(),
        rating: Rating::UNRATED,
        category: Category::Red,
        photo_refs: Vec::new(),
        lat: 37.5665,
        lng: 126.978,
        is_favorite: false,
        is_wishlist: false,
        memo: None,
        address: None,
    }
}

// =============================================================================
// HTTP mock
// =============================================================================

#[derive(Debug)]
struct MockState {
    accounts: Mutex<HashMap<String, String>>,
    delay: Duration,
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

/// Auth service over HTTP on `127.0.0.1`, stopped on drop.
///
/// Special addresses trigger failure modes: an email starting with `boom`
/// gets a 500, one starting with `garbled` gets a 200 with a non-JSON body.
#[derive(Debug)]
pub struct MockAuthServer {
    base_url: Url,
    handle: JoinHandle<()>,
}

impl MockAuthServer {
    /// Start a server knowing `accounts`, delaying every response by `delay`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start(accounts: &[(&str, &str)], delay: Duration) -> io::Result<Self> {
        let state = Arc::new(MockState {
            accounts: Mutex::new(
                accounts
                    .iter()
                    .map(|(e, p)| ((*e).to_owned(), (*p).to_owned()))
                    .collect(),
            ),
            delay,
        });

        let router = Router::new()
            .route("/auth/signin", post(sign_in))
            .route("/auth/signup", post(sign_up))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base_url = Url::parse(&format!("http://{addr}"))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { base_url, handle })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Drop for MockAuthServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn sign_in(State(state): State<Arc<MockState>>, Json(body): Json<Credentials>) -> Response {
    tokio::time::sleep(state.delay).await;

    if body.email.starts_with("boom") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "internal failure").into_response();
    }
    if body.email.starts_with("garbled") {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }

    let known = state
        .accounts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&body.email)
        .is_some_and(|p| *p == body.password);

    if known {
        Json(serde_json::json!({
            "accessToken": format!("access-{}", body.email),
            "refreshToken": format!("refresh-{}", body.email),
        }))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
    }
}

async fn sign_up(State(state): State<Arc<MockState>>, Json(body): Json<Credentials>) -> Response {
    tokio::time::sleep(state.delay).await;

    if body.password.len() < 4 {
        return (StatusCode::BAD_REQUEST, "password too short").into_response();
    }

    let mut accounts = state
        .accounts
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if accounts.contains_key(&body.email) {
        return (StatusCode::CONFLICT, "already registered").into_response();
    }
    accounts.insert(body.email, body.password);
    StatusCode::CREATED.into_response()
}
