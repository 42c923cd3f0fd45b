//! Core types for Matzip.
//!
//! This module provides type-safe wrappers for the domain: identities,
//! place and collection IDs, categories, ratings, places and collections.

pub mod category;
pub mod collection;
pub mod id;
pub mod identity;
pub mod place;

pub use category::Category;
pub use collection::{Collection, DraftCollection};
pub use id::{CollectionId, IdGenerator, PlaceId};
pub use identity::{Identity, IdentityError};
pub use place::{MAX_PHOTOS, NewPlace, Place, PlaceCandidate, Rating, ValidationError};
