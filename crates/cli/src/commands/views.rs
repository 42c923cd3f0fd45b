//! Read-only views: wishlist, calendar, stats.

use chrono::NaiveDate;
use matzip_client::Route;
use matzip_core::views::{self, Stats};
use tracing::info;

use super::{CliError, Matzip, describe};

/// List wishlist entries.
///
/// # Errors
///
/// Returns an error without a session.
pub fn wishlist(app: &mut Matzip) -> Result<(), CliError> {
    app.navigate(Route::Wishlist)?;
    let entries = views::wishlist(app.store().places());
    if entries.is_empty() {
        info!("Wishlist is empty.");
    }
    for place in entries {
        info!("{}", describe(place));
    }
    Ok(())
}

/// Show visit days for a month, or the visits on one day.
///
/// # Errors
///
/// Returns an error without a session or for an impossible date.
pub fn calendar(app: &mut Matzip, year: i32, month: u32, day: Option<u32>) -> Result<(), CliError> {
    app.navigate(Route::Calendar)?;
    let places = app.store().places();

    if let Some(day) = day {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| CliError::InvalidArgument(format!("{year}-{month:02}-{day:02}")))?;
        let visits = views::visits_on(places, date);
        if visits.is_empty() {
            info!("No visits on {date}.");
        }
        for place in visits {
            info!("{}", describe(place));
        }
        return Ok(());
    }

    let days = views::visit_days(places, year, month);
    if days.is_empty() {
        info!("No visits in {year}-{month:02}.");
        return Ok(());
    }
    let listed: Vec<String> = days.iter().map(|d| d.format("%d").to_string()).collect();
    info!("Visits in {year}-{month:02} on: {}", listed.join(", "));
    Ok(())
}

/// Show taste statistics and the shareable card.
///
/// # Errors
///
/// Returns an error without a session.
pub fn stats(app: &mut Matzip) -> Result<(), CliError> {
    app.navigate(Route::MyPage)?;
    let stats = Stats::from_places(app.store().places());
    let bio = app
        .session()
        .map(|s| s.profile().bio.clone())
        .unwrap_or_default();

    info!("Visited: {}", stats.visited);
    info!("Wishlist: {}", stats.wishlisted);
    info!("Average rating: {}", stats.average_rating_display());
    if let Some(style) = stats.preferred_style() {
        info!("Preferred: {style}");
    }
    info!("");
    for line in stats.taste_card(&bio).lines() {
        info!("{line}");
    }
    Ok(())
}
