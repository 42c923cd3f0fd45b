//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email does not normalize to a valid identity.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] matzip_core::IdentityError),

    /// Invalid credentials (wrong password or unknown account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account already exists.
    #[error("account already exists")]
    AlreadyRegistered,

    /// Server rejected the request.
    #[error("auth server returned {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The request did not complete in time.
    #[error("auth request timed out")]
    Timeout,

    /// Transport-level failure (DNS, connection refused, TLS).
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a body we could not decode.
    #[error("unexpected auth response: {0}")]
    InvalidResponse(String),

    /// HTTP client could not be constructed.
    #[error("auth client configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Message suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "Please enter a valid email address.",
            Self::InvalidCredentials => "Sign-in failed. Check your email and password.",
            Self::AlreadyRegistered => "An account with this email already exists.",
            Self::Rejected { .. } => "The request was rejected. Check your email and password format.",
            Self::Timeout => "The server took too long to respond. Please try again.",
            Self::Network(_) | Self::InvalidResponse(_) | Self::Config(_) => {
                "A server error occurred. Please try again later."
            }
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
