//! HTTP auth client against an in-process server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use matzip_client::{
    App, AppOptions, AuthClient, AuthError, AuthOutcome, Bootstrap, FileStore, HttpAuthClient,
    PlaceSource, PlaceStorage,
};
use matzip_integration_tests::{MockAuthServer, new_place};
use secrecy::{ExposeSecret, SecretString};

const TIMEOUT: Duration = Duration::from_secs(5);

async fn server() -> MockAuthServer {
    MockAuthServer::start(&[("x@y.com", "correct-horse")], Duration::ZERO)
        .await
        .unwrap()
}

fn client(server: &MockAuthServer, timeout: Duration) -> HttpAuthClient {
    HttpAuthClient::new(server.base_url().clone(), timeout).unwrap()
}

#[tokio::test]
async fn test_sign_in_returns_tokens() {
    let server = server().await;
    let tokens = client(&server, TIMEOUT)
        .sign_in("x@y.com", &SecretString::from("correct-horse"))
        .await
        .unwrap();

    assert_eq!(tokens.access_token.expose_secret(), "access-x@y.com");
    assert_eq!(
        tokens.refresh_token.unwrap().expose_secret(),
        "refresh-x@y.com"
    );
}

#[tokio::test]
async fn test_wrong_password_is_invalid_credentials() {
    let server = server().await;
    let err = client(&server, TIMEOUT)
        .sign_in("x@y.com", &SecretString::from("wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_server_error_is_rejected_with_status() {
    let server = server().await;
    let err = client(&server, TIMEOUT)
        .sign_in("boom@y.com", &SecretString::from("pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Rejected { status: 500, .. }));
}

#[tokio::test]
async fn test_garbled_body_is_invalid_response() {
    let server = server().await;
    let err = client(&server, TIMEOUT)
        .sign_in("garbled@y.com", &SecretString::from("pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_sign_up_then_conflict() {
    let server = server().await;
    let client = client(&server, TIMEOUT);

    client
        .sign_up("new@y.com", &SecretString::from("s3cret"))
        .await
        .unwrap();
    let err = client
        .sign_up("new@y.com", &SecretString::from("s3cret"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AlreadyRegistered));

    let err = client
        .sign_up("other@y.com", &SecretString::from("no"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockAuthServer::start(&[("x@y.com", "pw")], Duration::from_secs(5))
        .await
        .unwrap();
    let err = client(&server, Duration::from_millis(100))
        .sign_in("x@y.com", &SecretString::from("pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Timeout));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let base = {
        let server = server().await;
        server.base_url().clone()
    };
    // The server is gone once dropped; give the runtime a moment to close it.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = HttpAuthClient::new(base, TIMEOUT).unwrap();
    let err = client
        .sign_in("x@y.com", &SecretString::from("correct-horse"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Network(_) | AuthError::Timeout));
}

#[tokio::test]
async fn test_file_backed_session_survives_restart() {
    let server = server().await;
    let dir = tempfile::tempdir().unwrap();

    let open = || {
        App::new(
            client(&server, TIMEOUT),
            PlaceStorage::new(Arc::new(FileStore::new(dir.path()))),
            AppOptions::default(),
        )
    };

    let mut app = open();
    assert_eq!(app.bootstrap(), Bootstrap::SignedOut);
    let outcome = app
        .sign_in("X@Y.com", SecretString::from("correct-horse"))
        .await
        .unwrap();
    assert_eq!(outcome, AuthOutcome::Applied(PlaceSource::Empty));
    app.add_place(new_place("Kimchi House")).unwrap();
    drop(app);

    let mut app = open();
    assert!(matches!(
        app.bootstrap(),
        Bootstrap::Restored {
            source: PlaceSource::PerUser,
            ..
        }
    ));
    assert_eq!(app.store().places()[0].name, "Kimchi House");
    assert!(dir.path().join("matzip_places_x@y.com.json").exists());

    app.sign_out();
    let mut app = open();
    assert_eq!(app.bootstrap(), Bootstrap::SignedOut);
}
