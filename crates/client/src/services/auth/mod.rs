//! Authentication collaborator.
//!
//! The remote service owns accounts; this client only exchanges credentials
//! for tokens. [`AuthClient`] is the seam the session manager depends on and
//! [`HttpAuthClient`] is the production implementation.
//!
//! # Contract
//!
//! - `POST {base}/auth/signin` with `{"email", "password"}` returns
//!   `{"accessToken", "refreshToken"}` on success.
//! - `POST {base}/auth/signup` with `{"email", "password"}` returns any 2xx
//!   on success; no tokens are issued.

mod error;

pub use error::AuthError;

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use url::Url;

/// Tokens issued by a successful sign-in.
///
/// The client stores them verbatim and never inspects them.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
}

/// Remote account operations.
pub trait AuthClient: Send + Sync {
    /// Exchange credentials for tokens.
    fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<AuthTokens, AuthError>> + Send;

    /// Register a new account.
    fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// Request body for both endpoints.
#[derive(Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Response from the sign-in endpoint.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// [`AuthClient`] over HTTP.
#[derive(Clone)]
pub struct HttpAuthClient {
    client: Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAuthClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpAuthClient {
    /// Create a client for the given base URL with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if the HTTP client cannot be built.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Config(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.as_str().trim_end_matches('/'))
    }

    async fn post_credentials(
        &self,
        path: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<reqwest::Response, AuthError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .json(&CredentialsRequest {
                email,
                password: password.expose_secret(),
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        warn!(status = %status, body = %message, "Auth request rejected");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AuthError::InvalidCredentials,
            StatusCode::CONFLICT => AuthError::AlreadyRegistered,
            _ => AuthError::Rejected {
                status: status.as_u16(),
                message,
            },
        })
    }
}

impl AuthClient for HttpAuthClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<AuthTokens, AuthError> {
        let response = self.post_credentials("auth/signin", email, password).await?;
        let body: SignInResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        debug!(has_refresh = body.refresh_token.is_some(), "Signed in");

        Ok(AuthTokens {
            access_token: SecretString::from(body.access_token),
            refresh_token: body.refresh_token.map(SecretString::from),
        })
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<(), AuthError> {
        self.post_credentials("auth/signup", email, password).await?;
        debug!("Signed up");
        Ok(())
    }
}
