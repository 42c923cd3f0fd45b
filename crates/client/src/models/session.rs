//! Session-related types.
//!
//! Types describing the signed-in user for the lifetime of the process.

use matzip_core::Identity;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// Bio shown for sessions restored at bootstrap.
pub const DEFAULT_BIO: &str = "Your one-line taste intro shows up here";

/// Profile details shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: Identity,
    pub nickname: String,
    pub bio: String,
    pub following_count: u32,
    pub follower_count: u32,
}

impl UserProfile {
    /// Profile with the local part of the address as nickname.
    #[must_use]
    pub fn for_identity(identity: &Identity, bio: &str) -> Self {
        Self {
            email: identity.clone(),
            nickname: identity.local_part().to_owned(),
            bio: bio.to_owned(),
            following_count: 0,
            follower_count: 0,
        }
    }

    /// Profile with a chosen display name, falling back to the local part.
    #[must_use]
    pub fn with_display_name(identity: &Identity, display_name: &str) -> Self {
        let mut profile = Self::for_identity(identity, "");
        if !display_name.trim().is_empty() {
            display_name.trim().clone_into(&mut profile.nickname);
        }
        profile
    }
}

/// The authenticated user.
///
/// `check_value` is the password entered at sign-in, kept only in memory to
/// gate the profile editor. Sessions restored at bootstrap have none and so
/// can never pass re-verification without signing in again.
pub struct Session {
    identity: Identity,
    profile: UserProfile,
    check_value: Option<SecretString>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("profile", &self.profile)
            .field("check_value", &self.check_value.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Session {
    /// Session created by an interactive sign-in or sign-up.
    #[must_use]
    pub fn authenticated(
        identity: Identity,
        profile: UserProfile,
        check_value: SecretString,
    ) -> Self {
        Self {
            identity,
            profile,
            check_value: Some(check_value),
        }
    }

    /// Session restored from a remembered identity.
    #[must_use]
    pub fn restored(identity: Identity) -> Self {
        let profile = UserProfile::for_identity(&identity, DEFAULT_BIO);
        Self {
            identity,
            profile,
            check_value: None,
        }
    }

    /// Normalized identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Profile details.
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Replace the editable profile fields.
    pub fn update_profile(&mut self, nickname: &str, bio: &str) {
        nickname.clone_into(&mut self.profile.nickname);
        bio.clone_into(&mut self.profile.bio);
    }

    /// Compare a re-entered password against the sign-in value.
    #[must_use]
    pub fn verify(&self, input: &str) -> bool {
        self.check_value
            .as_ref()
            .is_some_and(|v| v.expose_secret() == input)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity::normalize("Foodie@Example.com").unwrap()
    }

    #[test]
    fn test_default_nickname_is_local_part() {
        let profile = UserProfile::for_identity(&identity(), "");
        assert_eq!(profile.nickname, "foodie");
    }

    #[test]
    fn test_display_name_overrides_nickname() {
        let profile = UserProfile::with_display_name(&identity(), " Minji ");
        assert_eq!(profile.nickname, "Minji");
        let profile = UserProfile::with_display_name(&identity(), "  ");
        assert_eq!(profile.nickname, "foodie");
    }

    #[test]
    fn test_verify_against_sign_in_password() {
        let session = Session::authenticated(
            identity(),
            UserProfile::for_identity(&identity(), ""),
            SecretString::from("pw"),
        );
        assert!(session.verify("pw"));
        assert!(!session.verify("PW"));
        assert!(!session.verify(""));
    }

    #[test]
    fn test_restored_session_never_verifies() {
        let session = Session::restored(identity());
        assert!(!session.verify(""));
        assert!(!session.verify("pw"));
        assert_eq!(session.profile().bio, DEFAULT_BIO);
    }

    #[test]
    fn test_debug_redacts_check_value() {
        let session = Session::authenticated(
            identity(),
            UserProfile::for_identity(&identity(), ""),
            SecretString::from("hunter2"),
        );
        let debug = format!("{session:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
