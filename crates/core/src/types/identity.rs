//! Normalized user identity.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when normalizing an [`Identity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The input is empty after trimming.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// A normalized email address identifying a user.
///
/// Normalization trims surrounding whitespace and lower-cases the address, so
/// `" A@B.com "` and `"a@b.com"` produce equal identities. The normalized form
/// is what per-user storage keys are derived from.
///
/// ## Constraints
///
/// - Length: 1-254 characters after trimming (RFC 5321 limit)
/// - Local part (before the first @) must not be empty
/// - Domain part (after the first @) must not be empty
///
/// ## Examples
///
/// ```
/// use matzip_core::Identity;
///
/// let a = Identity::normalize(" A@B.com ").unwrap();
/// let b = Identity::normalize("a@b.com").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "a@b.com");
///
/// assert!(Identity::normalize("   ").is_err());
/// assert!(Identity::normalize("no-at-symbol").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Normalize a raw email address into an `Identity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input:
    /// - Is empty
    /// - Is longer than 254 characters
    /// - Does not contain an @ symbol
    /// - Has an empty local part or domain
    pub fn normalize(raw: &str) -> Result<Self, IdentityError> {
        let s = raw.trim().to_lowercase();

        if s.is_empty() {
            return Err(IdentityError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(IdentityError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(IdentityError::MissingAtSymbol)?;

        if at_pos == 0 {
            return Err(IdentityError::EmptyLocalPart);
        }

        if at_pos == s.len() - 1 {
            return Err(IdentityError::EmptyDomain);
        }

        Ok(Self(s))
    }

    /// Returns the normalized address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Identity` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the local part of the address (before the @).
    ///
    /// Used as the default nickname for new profiles.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// Returns the domain part of the address (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split_once('@').map_or("", |(_, domain)| domain)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Identity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::normalize(&s)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
