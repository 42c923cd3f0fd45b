//! Derived read models over a place list.
//!
//! Everything here is a pure function of the store contents plus transient
//! filter state; nothing is cached or persisted.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{Category, Collection, Place};

/// Number of feed entries revealed per page.
pub const FEED_PAGE_SIZE: usize = 6;

/// Transient list filters shared by the feed and map screens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// Only show favorites in the feed.
    pub favorites_only: bool,
    /// Categories shown on the map. Empty means all.
    pub categories: BTreeSet<Category>,
}

impl Filters {
    /// Add the category if absent, remove it if present.
    pub fn toggle_category(&mut self, category: Category) {
        if !self.categories.remove(&category) {
            self.categories.insert(category);
        }
    }

    /// Whether the map category filter admits the place.
    #[must_use]
    pub fn admits_category(&self, place: &Place) -> bool {
        self.categories.is_empty() || self.categories.contains(&place.category)
    }
}

/// Feed entries: optional case-insensitive name search, optional favorites
/// filter, newest visit first.
#[must_use]
pub fn feed<'a>(places: &'a [Place], search: &str, favorites_only: bool) -> Vec<&'a Place> {
    let needle = search.trim().to_lowercase();
    let mut entries: Vec<&Place> = places
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .filter(|p| !favorites_only || p.is_favorite)
        .collect();
    entries.sort_by(|a, b| b.visit_date.cmp(&a.visit_date));
    entries
}

/// The entries revealed after scrolling to `page` (1-based, cumulative).
#[must_use]
pub fn revealed<T>(entries: &[T], page: usize) -> &[T] {
    let end = page.max(1).saturating_mul(FEED_PAGE_SIZE).min(entries.len());
    entries.get(..end).unwrap_or(entries)
}

/// Places shown on the map under the category filter.
#[must_use]
pub fn map_places<'a>(places: &'a [Place], filters: &Filters) -> Vec<&'a Place> {
    places.iter().filter(|p| filters.admits_category(p)).collect()
}

/// Wishlisted places.
#[must_use]
pub fn wishlist(places: &[Place]) -> Vec<&Place> {
    places.iter().filter(|p| p.is_wishlist).collect()
}

/// Places actually visited (not wishlist entries).
///
/// Also the candidate list when choosing places for a new collection.
#[must_use]
pub fn visited(places: &[Place]) -> Vec<&Place> {
    places.iter().filter(|p| !p.is_wishlist).collect()
}

/// Places referenced by a collection, in store order. Dangling IDs are skipped.
#[must_use]
pub fn collection_members<'a>(collection: &Collection, places: &'a [Place]) -> Vec<&'a Place> {
    places.iter().filter(|p| collection.contains(&p.id)).collect()
}

/// Visited places on a given day.
#[must_use]
pub fn visits_on(places: &[Place], date: NaiveDate) -> Vec<&Place> {
    places
        .iter()
        .filter(|p| !p.is_wishlist && p.visit_date == date)
        .collect()
}

/// Days of a month that have at least one visit.
#[must_use]
pub fn visit_days(places: &[Place], year: i32, month: u32) -> BTreeSet<NaiveDate> {
    places
        .iter()
        .filter(|p| !p.is_wishlist)
        .map(|p| p.visit_date)
        .filter(|d| d.year() == year && d.month() == month)
        .collect()
}

/// Summary shown on the profile page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub visited: usize,
    pub wishlisted: usize,
    /// Mean rating over visited places, unrated ones counted as 0.
    pub average_rating: f64,
    /// Up to two most-visited categories, most frequent first.
    pub preferred: Vec<Category>,
}

impl Stats {
    /// Compute the summary for a place list.
    #[must_use]
    pub fn from_places(places: &[Place]) -> Self {
        let visited = visited(places);

        // Counts in first-seen order so ties keep that order after the stable sort.
        let mut counts: Vec<(Category, usize)> = Vec::new();
        for place in &visited {
            match counts.iter_mut().find(|(c, _)| *c == place.category) {
                Some((_, n)) => *n += 1,
                None => counts.push((place.category, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let total: u32 = visited.iter().map(|p| u32::from(p.rating.value())).sum();
        #[allow(clippy::cast_precision_loss)] // place counts never approach 2^52
        let average_rating = if visited.is_empty() {
            0.0
        } else {
            f64::from(total) / visited.len() as f64
        };

        Self {
            visited: visited.len(),
            wishlisted: places.len() - visited.len(),
            average_rating,
            preferred: counts.into_iter().take(2).map(|(c, _)| c).collect(),
        }
    }

    /// Average rating with one decimal, e.g. `"4.5"`.
    #[must_use]
    pub fn average_rating_display(&self) -> String {
        format!("{:.1}", self.average_rating)
    }

    /// Preferred cuisine labels joined for display, or `None` without visits.
    #[must_use]
    pub fn preferred_style(&self) -> Option<String> {
        if self.preferred.is_empty() {
            return None;
        }
        Some(
            self.preferred
                .iter()
                .map(|c| c.label())
                .collect::<Vec<_>>()
                .join(" · "),
        )
    }

    /// Shareable plain-text taste card.
    #[must_use]
    pub fn taste_card(&self, bio: &str) -> String {
        let intro = if bio.trim().is_empty() {
            "No introduction yet"
        } else {
            bio.trim()
        };
        let style = self
            .preferred_style()
            .unwrap_or_else(|| "Not chosen yet".to_string());
        format!(
            "My restaurant taste card\n\n\
             • Intro: {intro}\n\
             • Preferred style: {style}\n\
             • Average rating: {}\n\
             • Places visited: {}\n",
            self.average_rating_display(),
            self.visited,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::{CollectionId, PlaceId, Rating};

    fn place(id: &str, name: &str, date: (i32, u32, u32), rating: u8, category: Category) -> Place {
        Place {
            id: PlaceId::new(id),
            name: name.to_string(),
            visit_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            rating: Rating::new(rating).unwrap(),
            category,
            photo_refs: Vec::new(),
            lat: 0.0,
            lng: 0.0,
            is_favorite: false,
            is_wishlist: false,
            memo: None,
            address: None,
        }
    }

    fn sample() -> Vec<Place> {
        let mut wish = place("4", "Sushi Zen", (2025, 11, 30), 0, Category::Blue);
        wish.is_wishlist = true;
        let mut fav = place("2", "Kimchi House", (2025, 11, 10), 5, Category::Red);
        fav.is_favorite = true;
        vec![
            place("1", "Bibim Table", (2025, 10, 3), 4, Category::Red),
            fav,
            place("3", "Pasta Lab", (2025, 11, 10), 3, Category::Yellow),
            wish,
        ]
    }

    #[test]
    fn test_feed_sorts_newest_first_and_searches() {
        let places = sample();
        let names: Vec<_> = feed(&places, "", false).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(names, ["4", "2", "3", "1"]);

        let hits = feed(&places, "KIMCHI", false);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Kimchi House");
    }

    #[test]
    fn test_feed_favorites_only() {
        let places = sample();
        let favs = feed(&places, "", true);
        assert_eq!(favs.len(), 1);
        assert!(favs[0].is_favorite);
    }

    #[test]
    fn test_revealed_pages() {
        let items: Vec<u32> = (0..14).collect();
        assert_eq!(revealed(&items, 1).len(), 6);
        assert_eq!(revealed(&items, 2).len(), 12);
        assert_eq!(revealed(&items, 3).len(), 14);
        assert_eq!(revealed(&items, 0).len(), 6);
    }

    #[test]
    fn test_map_category_filter() {
        let places = sample();
        let mut filters = Filters::default();
        assert_eq!(map_places(&places, &filters).len(), 4);

        filters.toggle_category(Category::Red);
        assert_eq!(map_places(&places, &filters).len(), 2);

        filters.toggle_category(Category::Red);
        assert!(filters.categories.is_empty());
    }

    #[test]
    fn test_wishlist_and_visited_partition() {
        let places = sample();
        assert_eq!(wishlist(&places).len(), 1);
        assert_eq!(visited(&places).len(), 3);
    }

    #[test]
    fn test_collection_members_skip_missing_ids() {
        let places = sample();
        let collection = Collection {
            id: CollectionId::new("c"),
            name: "Mix".to_string(),
            description: String::new(),
            place_ids: vec![PlaceId::new("3"), PlaceId::new("gone"), PlaceId::new("1")],
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };
        let ids: Vec<_> = collection_members(&collection, &places)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn test_calendar_views_ignore_wishlist() {
        let places = sample();
        let day = NaiveDate::from_ymd_opt(2025, 11, 10).unwrap();
        assert_eq!(visits_on(&places, day).len(), 2);

        let days = visit_days(&places, 2025, 11);
        assert_eq!(days.len(), 1);
        assert!(days.contains(&day));
        assert!(visit_days(&places, 2025, 12).is_empty());
    }

    #[test]
    fn test_stats() {
        let stats = Stats::from_places(&sample());
        assert_eq!(stats.visited, 3);
        assert_eq!(stats.wishlisted, 1);
        assert_eq!(stats.average_rating_display(), "4.0");
        assert_eq!(stats.preferred, vec![Category::Red, Category::Yellow]);
        assert_eq!(stats.preferred_style().as_deref(), Some("Korean · Western"));
    }

    #[test]
    fn test_stats_empty() {
        let stats = Stats::from_places(&[]);
        assert_eq!(stats.average_rating_display(), "0.0");
        assert!(stats.preferred_style().is_none());
        let card = stats.taste_card("  ");
        assert!(card.contains("No introduction yet"));
        assert!(card.contains("Places visited: 0"));
    }
}
