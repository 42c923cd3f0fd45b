//! Unified error handling with Sentry integration.
//!
//! Component errors convert into [`ClientError`] with `?`. User-facing
//! feedback goes through [`Notice`]s rather than error values, so callers
//! never have to render internal details.

use std::fmt;

use matzip_core::IdentityError;
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::navigation::NavigationError;
use crate::services::auth::AuthError;
use crate::storage::StorageError;
use crate::store::StoreError;

/// Client-level error type.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Place or collection mutation rejected.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Screen transition refused.
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Email address is not a valid identity.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),
}

impl ClientError {
    /// Report to Sentry if this is an operational failure rather than user input.
    pub fn report(&self) {
        if matches!(
            self,
            Self::Storage(_) | Self::Config(_) | Self::Auth(AuthError::InvalidResponse(_))
        ) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Client error"
            );
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => err.user_message().to_string(),
            Self::Identity(_) => "Please enter a valid email address.".to_string(),
            Self::Storage(_) | Self::Config(_) => "Something went wrong. Please try again.".to_string(),
            Self::Store(_) | Self::Navigation(_) => self.to_string(),
        }
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Set the Sentry user context for the signed-in identity.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(email.to_string()),
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("navigation", "Opened detail", Some(&[("place_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use matzip_core::PlaceId;

    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::from(StoreError::PlaceNotFound(PlaceId::new("42")));
        assert_eq!(err.to_string(), "Store error: place not found: 42");

        let err = ClientError::from(NavigationError::Unauthenticated);
        assert!(err.to_string().starts_with("Navigation error"));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = ClientError::from(StorageError::Unavailable("disk on fire".to_string()));
        assert!(!err.user_message().contains("disk on fire"));

        let err = ClientError::from(AuthError::InvalidCredentials);
        assert_eq!(err.user_message(), AuthError::InvalidCredentials.user_message());
    }

    #[test]
    fn test_notice_constructors() {
        assert_eq!(Notice::success("ok").level, NoticeLevel::Success);
        assert_eq!(Notice::error("no").to_string(), "no");
    }

    #[test]
    fn test_sentry_helpers_without_client_are_noops() {
        set_sentry_user("a@b.com");
        add_breadcrumb("auth", "signed in", Some(&[("email", "a@b.com")]));
        clear_sentry_user();
    }
}
