//! Places: restaurants the user visited or wants to visit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::id::PlaceId;

/// Maximum number of photo references a place may carry.
pub const MAX_PHOTOS: usize = 6;

/// Errors raised when a place fails validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Rating outside `0..=5`.
    #[error("rating must be between 0 and {max} (got {value})")]
    RatingOutOfRange {
        /// Rejected value.
        value: u8,
        /// Largest accepted value.
        max: u8,
    },
    /// More photos than allowed.
    #[error("a place can hold at most {max} photos (got {count})")]
    TooManyPhotos {
        /// Number of photos supplied.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// Name is blank.
    #[error("place name cannot be empty")]
    EmptyName,
}

/// A star rating: 1-5, or 0 when the place has not been rated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Highest rating.
    pub const MAX: u8 = 5;
    /// The "not rated" value.
    pub const UNRATED: Self = Self(0);

    /// Create a rating, rejecting values above [`Rating::MAX`].
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::RatingOutOfRange` for values above 5.
    pub const fn new(value: u8) -> Result<Self, ValidationError> {
        if value > Self::MAX {
            return Err(ValidationError::RatingOutOfRange {
                value,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// The raw star count.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether the place has been rated at all.
    #[must_use]
    pub const fn is_rated(self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A recorded place.
///
/// Field names on the wire follow the stored shape used by earlier clients
/// (`date`, `photos`, camel-cased flags), so existing local data still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Unique within one user's place set.
    pub id: PlaceId,
    /// Display name.
    pub name: String,
    /// Day of the visit (or the day it was wishlisted).
    #[serde(rename = "date")]
    pub visit_date: NaiveDate,
    /// Star rating.
    pub rating: Rating,
    /// Cuisine category.
    pub category: Category,
    /// Photo references, in display order.
    #[serde(rename = "photos", default)]
    pub photo_refs: Vec<String>,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Marked as a favorite.
    #[serde(default)]
    pub is_favorite: bool,
    /// Saved to the wishlist.
    #[serde(default)]
    pub is_wishlist: bool,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Place {
    /// Check the invariants a stored place must satisfy.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.photo_refs)
    }
}

/// A place that has not been added to a store yet.
///
/// `id` is optional; the store assigns a fresh one when it is absent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlace {
    /// Pre-assigned ID, if any.
    pub id: Option<PlaceId>,
    pub name: String,
    pub visit_date: NaiveDate,
    pub rating: Rating,
    pub category: Category,
    pub photo_refs: Vec<String>,
    pub lat: f64,
    pub lng: f64,
    pub is_favorite: bool,
    pub is_wishlist: bool,
    pub memo: Option<String>,
    pub address: Option<String>,
}

impl NewPlace {
    /// Start a draft at a coordinate picked on the map or found by search.
    ///
    /// The candidate's name and address seed the draft; everything else gets
    /// neutral defaults (unrated, `RED`, no photos, no facets set).
    #[must_use]
    pub fn from_candidate(candidate: PlaceCandidate, visit_date: NaiveDate) -> Self {
        Self {
            id: None,
            name: candidate.name.unwrap_or_default(),
            visit_date,
            rating: Rating::UNRATED,
            category: Category::default(),
            photo_refs: Vec::new(),
            lat: candidate.lat,
            lng: candidate.lng,
            is_favorite: false,
            is_wishlist: false,
            memo: None,
            address: candidate.address,
        }
    }

    /// Check the same invariants as [`Place::validate`].
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, &self.photo_refs)
    }

    /// The pre-assigned ID, ignoring a blank one.
    #[must_use]
    pub fn requested_id(&self) -> Option<&PlaceId> {
        self.id.as_ref().filter(|id| !id.as_str().trim().is_empty())
    }

    /// Finish the draft with the given ID.
    #[must_use]
    pub fn into_place(self, id: PlaceId) -> Place {
        Place {
            id,
            name: self.name,
            visit_date: self.visit_date,
            rating: self.rating,
            category: self.category,
            photo_refs: self.photo_refs,
            lat: self.lat,
            lng: self.lng,
            is_favorite: self.is_favorite,
            is_wishlist: self.is_wishlist,
            memo: self.memo,
            address: self.address,
        }
    }
}

impl From<Place> for NewPlace {
    fn from(place: Place) -> Self {
        Self {
            id: Some(place.id),
            name: place.name,
            visit_date: place.visit_date,
            rating: place.rating,
            category: place.category,
            photo_refs: place.photo_refs,
            lat: place.lat,
            lng: place.lng,
            is_favorite: place.is_favorite,
            is_wishlist: place.is_wishlist,
            memo: place.memo,
            address: place.address,
        }
    }
}

/// A point of interest returned by the map or keyword search collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

fn validate_fields(name: &str, photo_refs: &[String]) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if photo_refs.len() > MAX_PHOTOS {
        return Err(ValidationError::TooManyPhotos {
            count: photo_refs.len(),
            max: MAX_PHOTOS,
        });
    }
    Ok(())
}
