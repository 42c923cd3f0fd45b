//! Navigation state machine.
//!
//! Exactly one [`Screen`] is active. Screens that show a specific record
//! carry it, so "detail with nothing selected" cannot be expressed. Plain
//! [`Route`]s are what a tab bar or back button asks for; routes that need a
//! record are entered through the dedicated `view_*` methods instead.
//!
//! Every accepted transition bumps the epoch. In-flight work started on one
//! screen compares epochs to notice that the user has moved on.

use std::fmt;
use std::str::FromStr;

use matzip_core::views::Filters;
use matzip_core::{Collection, DraftCollection, Place};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Why a transition was refused. The screen is unchanged in every case.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    #[error("sign in to continue")]
    Unauthenticated,

    #[error("{0} needs a selected record")]
    MissingSelection(Route),

    #[error("confirm your password first")]
    VerificationRequired,

    #[error("only available from {0}")]
    WrongScreen(Route),
}

/// Payload-free screen names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Login,
    Signup,
    Map,
    MapSearch,
    Feed,
    Calendar,
    #[serde(rename = "mypage")]
    MyPage,
    Detail,
    PasswordVerify,
    ProfileEdit,
    Wishlist,
    WishlistSearch,
    CollectionDetail,
    CollectionCreate,
    CollectionAddPlaces,
}

impl Route {
    pub const ALL: [Self; 15] = [
        Self::Login,
        Self::Signup,
        Self::Map,
        Self::MapSearch,
        Self::Feed,
        Self::Calendar,
        Self::MyPage,
        Self::Detail,
        Self::PasswordVerify,
        Self::ProfileEdit,
        Self::Wishlist,
        Self::WishlistSearch,
        Self::CollectionDetail,
        Self::CollectionCreate,
        Self::CollectionAddPlaces,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::Map => "map",
            Self::MapSearch => "map-search",
            Self::Feed => "feed",
            Self::Calendar => "calendar",
            Self::MyPage => "mypage",
            Self::Detail => "detail",
            Self::PasswordVerify => "password-verify",
            Self::ProfileEdit => "profile-edit",
            Self::Wishlist => "wishlist",
            Self::WishlistSearch => "wishlist-search",
            Self::CollectionDetail => "collection-detail",
            Self::CollectionCreate => "collection-create",
            Self::CollectionAddPlaces => "collection-add-places",
        }
    }

    /// Reachable without a session.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }

    /// Only reachable with a selected record.
    #[must_use]
    pub const fn needs_selection(self) -> bool {
        matches!(
            self,
            Self::Detail | Self::CollectionDetail | Self::CollectionAddPlaces
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown screen: {s}"))
    }
}

/// The active screen and whatever it displays.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Login,
    Signup,
    /// Map, optionally centered on one place.
    Map { focus: Option<Place> },
    MapSearch,
    Feed,
    Calendar,
    MyPage,
    Detail(Place),
    /// Password re-entry before profile editing; `error` is shown inline.
    PasswordVerify { error: Option<String> },
    ProfileEdit,
    Wishlist,
    WishlistSearch,
    CollectionDetail(Collection),
    CollectionCreate,
    CollectionAddPlaces(DraftCollection),
}

impl Screen {
    #[must_use]
    pub const fn route(&self) -> Route {
        match self {
            Self::Login => Route::Login,
            Self::Signup => Route::Signup,
            Self::Map { .. } => Route::Map,
            Self::MapSearch => Route::MapSearch,
            Self::Feed => Route::Feed,
            Self::Calendar => Route::Calendar,
            Self::MyPage => Route::MyPage,
            Self::Detail(_) => Route::Detail,
            Self::PasswordVerify { .. } => Route::PasswordVerify,
            Self::ProfileEdit => Route::ProfileEdit,
            Self::Wishlist => Route::Wishlist,
            Self::WishlistSearch => Route::WishlistSearch,
            Self::CollectionDetail(_) => Route::CollectionDetail,
            Self::CollectionCreate => Route::CollectionCreate,
            Self::CollectionAddPlaces(_) => Route::CollectionAddPlaces,
        }
    }

    /// The selected place, on screens that carry one.
    #[must_use]
    pub const fn selected_place(&self) -> Option<&Place> {
        match self {
            Self::Detail(place) | Self::Map { focus: Some(place) } => Some(place),
            _ => None,
        }
    }
}

/// Screen state plus view-local filters.
#[derive(Debug, Clone)]
pub struct Navigator {
    screen: Screen,
    filters: Filters,
    epoch: u64,
    authenticated: bool,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    /// Start at login with no session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            filters: Filters::default(),
            epoch: 0,
            authenticated: false,
        }
    }

    #[must_use]
    pub const fn screen(&self) -> &Screen {
        &self.screen
    }

    #[must_use]
    pub const fn route(&self) -> Route {
        self.screen.route()
    }

    /// Count of accepted transitions.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    pub const fn filters_mut(&mut self) -> &mut Filters {
        &mut self.filters
    }

    /// Go to a payload-free screen.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` for any non-public route without a session
    /// - `MissingSelection` for routes that display a record
    /// - `VerificationRequired` for the profile editor
    pub fn navigate(&mut self, route: Route) -> Result<(), NavigationError> {
        self.require_session(route)?;
        let screen = match route {
            Route::Login => Screen::Login,
            Route::Signup => Screen::Signup,
            Route::Map => Screen::Map { focus: None },
            Route::MapSearch => Screen::MapSearch,
            Route::Feed => Screen::Feed,
            Route::Calendar => Screen::Calendar,
            Route::MyPage => Screen::MyPage,
            Route::PasswordVerify => Screen::PasswordVerify { error: None },
            Route::Wishlist => Screen::Wishlist,
            Route::WishlistSearch => Screen::WishlistSearch,
            Route::CollectionCreate => Screen::CollectionCreate,
            Route::ProfileEdit => return Err(NavigationError::VerificationRequired),
            Route::Detail | Route::CollectionDetail | Route::CollectionAddPlaces => {
                return Err(NavigationError::MissingSelection(route));
            }
        };
        self.enter(screen);
        Ok(())
    }

    /// Show one place in detail.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without a session.
    pub fn view_detail(&mut self, place: Place) -> Result<(), NavigationError> {
        self.require_session(Route::Detail)?;
        self.enter(Screen::Detail(place));
        Ok(())
    }

    /// Show the map centered on a place.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without a session.
    pub fn view_on_map(&mut self, place: Place) -> Result<(), NavigationError> {
        self.require_session(Route::Map)?;
        self.enter(Screen::Map { focus: Some(place) });
        Ok(())
    }

    /// Show one collection's members.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without a session.
    pub fn view_collection(&mut self, collection: Collection) -> Result<(), NavigationError> {
        self.require_session(Route::CollectionDetail)?;
        self.enter(Screen::CollectionDetail(collection));
        Ok(())
    }

    /// Second wizard step: pick places for a fresh draft.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without a session.
    pub fn pick_collection_places(&mut self, draft: DraftCollection) -> Result<(), NavigationError> {
        self.require_session(Route::CollectionAddPlaces)?;
        self.enter(Screen::CollectionAddPlaces(draft));
        Ok(())
    }

    /// Open the profile editor after a successful password check.
    pub(crate) fn verified(&mut self) {
        self.enter(Screen::ProfileEdit);
    }

    /// Stay on password entry and show why.
    pub(crate) fn verification_failed(&mut self, message: &str) {
        self.enter(Screen::PasswordVerify {
            error: Some(message.to_owned()),
        });
    }

    /// Session started: unlock protected screens and land on the map.
    pub(crate) fn signed_in(&mut self) {
        self.authenticated = true;
        self.filters = Filters::default();
        self.enter(Screen::Map { focus: None });
    }

    /// Session ended: back to login.
    pub(crate) fn signed_out(&mut self) {
        self.authenticated = false;
        self.filters = Filters::default();
        self.enter(Screen::Login);
    }

    /// Jump to a screen after a completed action. Protected screens still
    /// require a session.
    pub(crate) fn land(&mut self, screen: Screen) -> Result<(), NavigationError> {
        self.require_session(screen.route())?;
        self.enter(screen);
        Ok(())
    }

    /// Swap in a newer copy of the displayed place without leaving the screen.
    pub(crate) fn refresh_selection(&mut self, updated: &Place) {
        match &mut self.screen {
            Screen::Detail(place) | Screen::Map { focus: Some(place) } if place.id == updated.id => {
                place.clone_from(updated);
            }
            _ => {}
        }
    }

    const fn require_session(&self, route: Route) -> Result<(), NavigationError> {
        if self.authenticated || route.is_public() {
            Ok(())
        } else {
            Err(NavigationError::Unauthenticated)
        }
    }

    fn enter(&mut self, screen: Screen) {
        debug!(from = %self.screen.route(), to = %screen.route(), "Screen transition");
        self.screen = screen;
        self.epoch += 1;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use matzip_core::{Category, CollectionId, PlaceId, Rating};

    use super::*;

    fn place() -> Place {
        Place {
            id: PlaceId::new("1"),
            name: "Kimchi House".to_string(),
            visit_date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            rating: Rating::new(4).unwrap(),
            category: Category::Red,
            photo_refs: Vec::new(),
            lat: 37.5,
            lng: 127.0,
            is_favorite: false,
            is_wishlist: false,
            memo: None,
            address: None,
        }
    }

    fn signed_in() -> Navigator {
        let mut nav = Navigator::new();
        nav.signed_in();
        nav
    }

    #[test]
    fn test_route_names_round_trip() {
        for route in Route::ALL {
            assert_eq!(route.as_str().parse::<Route>().unwrap(), route);
            assert_eq!(
                serde_json::to_string(&route).unwrap(),
                format!("\"{}\"", route.as_str())
            );
        }
        assert!("settings".parse::<Route>().is_err());
    }

    #[test]
    fn test_starts_at_login() {
        let nav = Navigator::new();
        assert_eq!(nav.screen(), &Screen::Login);
        assert_eq!(nav.epoch(), 0);
    }

    #[test]
    fn test_unauthenticated_only_reaches_public_screens() {
        let mut nav = Navigator::new();
        for route in Route::ALL.into_iter().filter(|r| !r.is_public()) {
            assert_eq!(nav.navigate(route), Err(NavigationError::Unauthenticated), "{route}");
            assert_eq!(nav.screen(), &Screen::Login);
        }
        assert_eq!(nav.view_detail(place()), Err(NavigationError::Unauthenticated));
        nav.navigate(Route::Signup).unwrap();
        assert_eq!(nav.route(), Route::Signup);
    }

    #[test]
    fn test_payload_routes_need_selection() {
        let mut nav = signed_in();
        for route in [Route::Detail, Route::CollectionDetail, Route::CollectionAddPlaces] {
            assert_eq!(nav.navigate(route), Err(NavigationError::MissingSelection(route)));
        }
        assert_eq!(nav.route(), Route::Map);
    }

    #[test]
    fn test_profile_edit_needs_verification() {
        let mut nav = signed_in();
        assert_eq!(
            nav.navigate(Route::ProfileEdit),
            Err(NavigationError::VerificationRequired)
        );
        nav.verified();
        assert_eq!(nav.route(), Route::ProfileEdit);
    }

    #[test]
    fn test_payload_screens_carry_their_record() {
        let mut nav = signed_in();
        nav.view_detail(place()).unwrap();
        assert_eq!(nav.screen().selected_place(), Some(&place()));

        nav.view_on_map(place()).unwrap();
        assert_eq!(nav.screen(), &Screen::Map { focus: Some(place()) });

        let collection = Collection {
            id: CollectionId::new("c1"),
            name: "Date Spots".to_string(),
            description: String::new(),
            place_ids: vec![PlaceId::new("1")],
            created_at: Utc::now(),
        };
        nav.view_collection(collection.clone()).unwrap();
        assert_eq!(nav.screen(), &Screen::CollectionDetail(collection));
    }

    #[test]
    fn test_epoch_advances_only_on_accepted_transitions() {
        let mut nav = signed_in();
        let start = nav.epoch();
        nav.navigate(Route::Feed).unwrap();
        assert_eq!(nav.epoch(), start + 1);
        nav.navigate(Route::Detail).unwrap_err();
        assert_eq!(nav.epoch(), start + 1);
    }

    #[test]
    fn test_sign_out_resets_filters_and_locks() {
        let mut nav = signed_in();
        nav.filters_mut().toggle_category(Category::Blue);
        nav.signed_out();
        assert!(nav.filters().categories.is_empty());
        assert_eq!(nav.navigate(Route::Feed), Err(NavigationError::Unauthenticated));
    }

    #[test]
    fn test_verification_failure_stays_with_error() {
        let mut nav = signed_in();
        nav.navigate(Route::PasswordVerify).unwrap();
        nav.verification_failed("wrong password");
        assert_eq!(
            nav.screen(),
            &Screen::PasswordVerify {
                error: Some("wrong password".to_string())
            }
        );
    }
}
