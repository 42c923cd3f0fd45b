//! Place/Collection Store.
//!
//! The in-memory record set is the single source of truth for the running
//! session. Every place mutation transforms the list and then mirrors the
//! full list to storage before returning:
//!
//! - to the signed-in identity's scope, when there is one
//! - to the global scope, always, so data written by this version is still
//!   found by the migration fallback
//!
//! Collections live in memory only and are dropped when the session changes.

use chrono::Utc;
use matzip_core::{
    Collection, CollectionId, DraftCollection, IdGenerator, Identity, NewPlace, Place, PlaceId,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::storage::{PlaceStorage, Scope, WriteOutcome};

/// Errors returned by store mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No place with this ID.
    #[error("place not found: {0}")]
    PlaceNotFound(PlaceId),

    /// A place with this ID already exists.
    #[error("duplicate place id: {0}")]
    DuplicateId(PlaceId),

    /// Place data violates an invariant.
    #[error("invalid place: {0}")]
    Invalid(#[from] ValidationError),
}

/// What happens to collection memberships when a place is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CascadePolicy {
    /// Leave dangling IDs in collections; readers filter them out.
    #[default]
    Retain,
    /// Remove the deleted ID from every collection.
    Prune,
}

/// Storage outcomes of one mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    /// Per-identity write; `None` without a session.
    pub user: Option<WriteOutcome>,
    /// Global-scope write.
    pub global: WriteOutcome,
}

impl PersistReport {
    /// Whether every attempted write reached storage.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.global.is_written() && self.user.as_ref().is_none_or(WriteOutcome::is_written)
    }
}

/// A mutation's result value together with how it was persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation<T> {
    pub value: T,
    pub persisted: PersistReport,
}

/// Authoritative places and collections for one session.
#[derive(Debug)]
pub struct PlaceStore {
    places: Vec<Place>,
    collections: Vec<Collection>,
    draft: Option<DraftCollection>,
    owner: Option<Identity>,
    storage: PlaceStorage,
    ids: IdGenerator,
    cascade: CascadePolicy,
}

impl PlaceStore {
    /// Create an empty store with no owner.
    #[must_use]
    pub const fn new(storage: PlaceStorage, cascade: CascadePolicy) -> Self {
        Self {
            places: Vec::new(),
            collections: Vec::new(),
            draft: None,
            owner: None,
            storage,
            ids: IdGenerator::new(),
            cascade,
        }
    }

    /// Replace the whole record set for a new session.
    ///
    /// Only the session manager calls this; it is the one place the identity
    /// the store persists under can change.
    pub(crate) fn reseed(&mut self, owner: Option<Identity>, places: Vec<Place>) {
        debug!(
            owner = owner.as_ref().map(Identity::as_str),
            count = places.len(),
            "Store reseeded"
        );
        self.owner = owner;
        self.places = places;
        self.collections.clear();
        self.draft = None;
    }

    /// All places, in insertion order.
    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    /// Look up a place.
    #[must_use]
    pub fn place(&self, id: &PlaceId) -> Option<&Place> {
        self.places.iter().find(|p| &p.id == id)
    }

    /// Committed collections, in creation order.
    #[must_use]
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Look up a collection.
    #[must_use]
    pub fn collection(&self, id: &CollectionId) -> Option<&Collection> {
        self.collections.iter().find(|c| &c.id == id)
    }

    /// The collection under construction, if any.
    #[must_use]
    pub const fn draft(&self) -> Option<&DraftCollection> {
        self.draft.as_ref()
    }

    /// Identity mutations are persisted for.
    #[must_use]
    pub const fn owner(&self) -> Option<&Identity> {
        self.owner.as_ref()
    }

    /// Configured delete behavior.
    #[must_use]
    pub const fn cascade(&self) -> CascadePolicy {
        self.cascade
    }

    // =========================================================================
    // Places
    // =========================================================================

    /// Append a place, assigning a fresh ID when the draft has none.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Invalid` if the place fails validation, or
    /// `StoreError::DuplicateId` if a supplied ID is already used.
    pub fn add_place(&mut self, new: NewPlace) -> Result<Mutation<Place>, StoreError> {
        new.validate()?;

        let id = match new.requested_id().cloned() {
            Some(id) if self.place(&id).is_some() => return Err(StoreError::DuplicateId(id)),
            Some(id) => id,
            None => {
                let places = &self.places;
                PlaceId::new(
                    self.ids
                        .next_unused(Utc::now(), |c| places.iter().any(|p| p.id.as_str() == c)),
                )
            }
        };

        let place = new.into_place(id);
        debug!(place_id = %place.id, name = %place.name, "Adding place");
        self.places.push(place.clone());

        Ok(Mutation {
            value: place,
            persisted: self.persist(),
        })
    }

    /// Append a place with the wishlist facet set.
    ///
    /// # Errors
    ///
    /// Same as [`PlaceStore::add_place`].
    pub fn add_wishlist_place(&mut self, mut new: NewPlace) -> Result<Mutation<Place>, StoreError> {
        new.is_wishlist = true;
        self.add_place(new)
    }

    /// Replace the place with the same ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PlaceNotFound` if no place has that ID, or
    /// `StoreError::Invalid` if the replacement fails validation. The list is
    /// untouched in both cases.
    pub fn update_place(&mut self, updated: Place) -> Result<Mutation<()>, StoreError> {
        updated.validate()?;

        let slot = self
            .places
            .iter_mut()
            .find(|p| p.id == updated.id)
            .ok_or_else(|| StoreError::PlaceNotFound(updated.id.clone()))?;

        debug!(place_id = %updated.id, "Updating place");
        *slot = updated;

        Ok(Mutation {
            value: (),
            persisted: self.persist(),
        })
    }

    /// Remove a place and return it.
    ///
    /// Collections keep referencing the ID unless the store was built with
    /// [`CascadePolicy::Prune`].
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PlaceNotFound` if no place has that ID.
    pub fn delete_place(&mut self, id: &PlaceId) -> Result<Mutation<Place>, StoreError> {
        let index = self
            .places
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| StoreError::PlaceNotFound(id.clone()))?;

        let removed = self.places.remove(index);
        debug!(place_id = %id, "Deleted place");

        if self.cascade == CascadePolicy::Prune {
            for collection in &mut self.collections {
                collection.place_ids.retain(|member| member != id);
            }
        }

        Ok(Mutation {
            value: removed,
            persisted: self.persist(),
        })
    }

    /// Flip the favorite facet. Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PlaceNotFound` if no place has that ID.
    pub fn toggle_favorite(&mut self, id: &PlaceId) -> Result<Mutation<bool>, StoreError> {
        self.toggle(id, |p| &mut p.is_favorite)
    }

    /// Flip the wishlist facet. Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::PlaceNotFound` if no place has that ID.
    pub fn toggle_wishlist(&mut self, id: &PlaceId) -> Result<Mutation<bool>, StoreError> {
        self.toggle(id, |p| &mut p.is_wishlist)
    }

    fn toggle(
        &mut self,
        id: &PlaceId,
        facet: impl FnOnce(&mut Place) -> &mut bool,
    ) -> Result<Mutation<bool>, StoreError> {
        let place = self
            .places
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::PlaceNotFound(id.clone()))?;

        let flag = facet(place);
        *flag = !*flag;
        let value = *flag;
        debug!(place_id = %id, value, "Toggled facet");

        Ok(Mutation {
            value,
            persisted: self.persist(),
        })
    }

    fn persist(&self) -> PersistReport {
        let user = self
            .owner
            .as_ref()
            .map(|identity| self.storage.write_scoped(&Scope::User(identity.clone()), &self.places));
        let global = self.storage.write_scoped(&Scope::Global, &self.places);
        PersistReport { user, global }
    }

    // =========================================================================
    // Collections
    // =========================================================================

    /// Start a new collection draft, replacing any pending one.
    pub fn create_collection(&mut self, name: &str, description: &str) -> &DraftCollection {
        let now = Utc::now();
        let collections = &self.collections;
        let id = self
            .ids
            .next_unused(now, |c| collections.iter().any(|col| col.id.as_str() == c));

        debug!(collection_id = %id, name, "Drafting collection");
        self.draft.insert(DraftCollection {
            id: CollectionId::new(id),
            name: name.to_owned(),
            description: description.to_owned(),
            created_at: now,
        })
    }

    /// Finish the pending draft with the chosen places.
    ///
    /// Any number of places, including none, is accepted. Returns `None` and
    /// changes nothing when there is no draft.
    pub fn commit_collection(&mut self, place_ids: Vec<PlaceId>) -> Option<&Collection> {
        let draft = self.draft.take()?;
        let collection = draft.commit(place_ids);
        debug!(
            collection_id = %collection.id,
            count = collection.place_ids.len(),
            "Committed collection"
        );
        self.collections.push(collection);
        self.collections.last()
    }

    /// Drop the pending draft, if any.
    pub fn discard_draft(&mut self) -> Option<DraftCollection> {
        self.draft.take()
    }

    /// Remove a collection. Places are untouched.
    pub fn delete_collection(&mut self, id: &CollectionId) -> Option<Collection> {
        let index = self.collections.iter().position(|c| &c.id == id)?;
        debug!(collection_id = %id, "Deleted collection");
        Some(self.collections.remove(index))
    }
}
