//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing place IDs with collection IDs.

use chrono::{DateTime, Utc};

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<&str>`, `From<String>` and `Into<String>` implementations
///
/// IDs are strings because stored data written by earlier clients uses
/// decimal timestamp strings.
///
/// # Example
///
/// ```rust
/// # use matzip_core::define_id;
/// define_id!(TagId);
/// define_id!(NoteId);
///
/// let tag = TagId::new("1");
/// let note = NoteId::new("1");
///
/// // These are different types, so this won't compile:
/// // let _: TagId = note;
/// # let _ = (tag, note);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(PlaceId);
define_id!(CollectionId);

/// Issues timestamp-based IDs.
///
/// IDs are milliseconds since the Unix epoch rendered as decimal strings.
/// Two calls within the same millisecond (or a clock that steps backwards)
/// still yield strictly increasing values, because each issued value is at
/// least one greater than the previous one.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    /// Create a generator that has not issued anything yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Issue the next raw ID for the given instant.
    pub fn next_raw(&mut self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis();
        self.last = if millis > self.last {
            millis
        } else {
            self.last + 1
        };
        self.last.to_string()
    }

    /// Issue the next ID that `is_taken` reports as unused.
    pub fn next_unused(&mut self, now: DateTime<Utc>, is_taken: impl Fn(&str) -> bool) -> String {
        let mut candidate = self.next_raw(now);
        while is_taken(&candidate) {
            candidate = self.next_raw(now);
        }
        candidate
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let id = PlaceId::new("1732000000000");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1732000000000\"");
        let back: PlaceId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back.as_str(), "42");
    }

    #[test]
    fn test_generator_uses_timestamp_millis() {
        let now = Utc.timestamp_millis_opt(1_732_000_000_123).unwrap();
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_raw(now), "1732000000123");
    }

    #[test]
    fn test_generator_is_strictly_increasing_within_same_millisecond() {
        let now = Utc.timestamp_millis_opt(1_000).unwrap();
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_raw(now), "1000");
        assert_eq!(ids.next_raw(now), "1001");
        let earlier = Utc.timestamp_millis_opt(500).unwrap();
        assert_eq!(ids.next_raw(earlier), "1002");
    }

    #[test]
    fn test_generator_skips_taken_ids() {
        let now = Utc.timestamp_millis_opt(7).unwrap();
        let mut ids = IdGenerator::new();
        let taken = ["7", "8"];
        let id = ids.next_unused(now, |candidate| taken.contains(&candidate));
        assert_eq!(id, "9");
    }
}
