//! User-curated groups of places.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{CollectionId, PlaceId};

/// A named, ordered group of places.
///
/// `place_ids` may reference places that have since been deleted; readers
/// treat unknown IDs as filtered out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub description: String,
    pub place_ids: Vec<PlaceId>,
    pub created_at: DateTime<Utc>,
}

impl Collection {
    /// Whether the collection lists the given place.
    #[must_use]
    pub fn contains(&self, id: &PlaceId) -> bool {
        self.place_ids.contains(id)
    }
}

/// A collection under construction, before its places are chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftCollection {
    pub id: CollectionId,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl DraftCollection {
    /// Finalize the draft with the chosen places.
    #[must_use]
    pub fn commit(self, place_ids: Vec<PlaceId>) -> Collection {
        Collection {
            id: self.id,
            name: self.name,
            description: self.description,
            place_ids,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_commit_keeps_draft_fields() {
        let created_at = Utc.with_ymd_and_hms(2025, 11, 20, 9, 0, 0).unwrap();
        let draft = DraftCollection {
            id: CollectionId::new("c1"),
            name: "Date Spots".to_string(),
            description: "desc".to_string(),
            created_at,
        };
        let collection = draft.commit(vec![PlaceId::new("1"), PlaceId::new("2")]);
        assert_eq!(collection.id.as_str(), "c1");
        assert_eq!(collection.created_at, created_at);
        assert!(collection.contains(&PlaceId::new("2")));
        assert!(!collection.contains(&PlaceId::new("3")));
    }

    #[test]
    fn test_serde_shape() {
        let collection = Collection {
            id: CollectionId::new("c1"),
            name: "Lunch".to_string(),
            description: String::new(),
            place_ids: vec![PlaceId::new("1")],
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["placeIds"][0], "1");
        assert!(json.get("createdAt").is_some());
    }
}
