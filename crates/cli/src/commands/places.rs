//! Place commands.

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use matzip_core::views::{self, FEED_PAGE_SIZE};
use matzip_core::{Category, NewPlace, PlaceId, Rating};
use tracing::info;

use super::{CliError, Matzip, describe};

#[derive(Subcommand)]
pub enum PlaceAction {
    /// Record a visit
    Add(PlaceArgs),
    /// List visits, newest first
    List {
        /// Only names containing this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only favorites
        #[arg(short, long)]
        favorites: bool,

        /// Pages of six to show
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },
    /// Show one place
    Show {
        id: String,
    },
    /// Change a recorded place
    Update {
        id: String,

        #[command(flatten)]
        changes: PlaceChanges,
    },
    /// Delete a place
    Delete {
        id: String,
    },
    /// Flip the favorite flag
    Favorite {
        id: String,
    },
    /// Flip the wishlist flag
    Wishlist {
        id: String,
    },
}

/// Fields for a new place.
#[derive(Args)]
pub struct PlaceArgs {
    /// Restaurant name
    #[arg(long)]
    name: String,

    /// Visit date (YYYY-MM-DD, default today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Rating 0-5 (0 = unrated)
    #[arg(long, default_value_t = 0)]
    rating: u8,

    /// Cuisine category (red, yellow, green, blue, purple)
    #[arg(long, default_value = "red")]
    category: Category,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lat: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lng: f64,

    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    memo: Option<String>,

    /// Photo reference (repeatable, up to six)
    #[arg(long = "photo")]
    photos: Vec<String>,

    #[arg(long)]
    favorite: bool,

    /// Save to the wishlist instead of recording a visit
    #[arg(long)]
    wishlist: bool,
}

/// Optional replacements for an existing place.
#[derive(Args)]
pub struct PlaceChanges {
    #[arg(long)]
    name: Option<String>,

    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long)]
    rating: Option<u8>,

    #[arg(long)]
    category: Option<Category>,

    #[arg(long)]
    memo: Option<String>,

    #[arg(long)]
    address: Option<String>,
}

/// Dispatch a place subcommand.
///
/// # Errors
///
/// Returns an error if there is no session, the place does not exist, or
/// the input fails validation.
pub fn run(app: &mut Matzip, action: PlaceAction) -> Result<(), CliError> {
    match action {
        PlaceAction::Add(args) => add(app, args),
        PlaceAction::List {
            search,
            favorites,
            pages,
        } => {
            list(app, &search, favorites, pages);
            Ok(())
        }
        PlaceAction::Show { id } => show(app, &PlaceId::new(id)),
        PlaceAction::Update { id, changes } => update(app, &PlaceId::new(id), changes),
        PlaceAction::Delete { id } => {
            let deleted = app.delete_place(&PlaceId::new(id))?;
            info!("Deleted {}", describe(&deleted.value));
            warn_if_unsaved(deleted.persisted.is_durable());
            Ok(())
        }
        PlaceAction::Favorite { id } => {
            let toggled = app.toggle_favorite(&PlaceId::new(id))?;
            info!("Favorite: {}", toggled.value);
            warn_if_unsaved(toggled.persisted.is_durable());
            Ok(())
        }
        PlaceAction::Wishlist { id } => {
            let toggled = app.toggle_wishlist(&PlaceId::new(id))?;
            info!("Wishlist: {}", toggled.value);
            warn_if_unsaved(toggled.persisted.is_durable());
            Ok(())
        }
    }
}

fn rating(value: u8) -> Result<Rating, CliError> {
    Rating::new(value).map_err(|e| CliError::InvalidArgument(e.to_string()))
}

fn add(app: &mut Matzip, args: PlaceArgs) -> Result<(), CliError> {
    let new = NewPlace {
        id: None,
        name: args.name,
        visit_date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        rating: rating(args.rating)?,
        category: args.category,
        photo_refs: args.photos,
        lat: args.lat,
        lng: args.lng,
        is_favorite: args.favorite,
        is_wishlist: false,
        memo: args.memo,
        address: args.address,
    };

    let added = if args.wishlist {
        app.add_wishlist_place(new)?
    } else {
        app.add_place(new)?
    };
    info!("Added {}", describe(&added.value));
    warn_if_unsaved(added.persisted.is_durable());
    Ok(())
}

fn list(app: &Matzip, search: &str, favorites: bool, pages: usize) {
    let entries = views::feed(app.store().places(), search, favorites);
    if entries.is_empty() {
        info!("No places.");
        return;
    }
    let shown = views::revealed(&entries, pages);
    for place in shown {
        info!("{}", describe(place));
    }
    if shown.len() < entries.len() {
        info!(
            "Showing {} of {}; use --pages {} for the next {FEED_PAGE_SIZE}.",
            shown.len(),
            entries.len(),
            pages + 1
        );
    }
}

fn show(app: &mut Matzip, id: &PlaceId) -> Result<(), CliError> {
    app.view_detail(id)?;
    if let Some(place) = app.screen().selected_place() {
        info!("{}", describe(place));
        info!("  at {:.5}, {:.5}", place.lat, place.lng);
        if let Some(address) = &place.address {
            info!("  {address}");
        }
        if let Some(memo) = &place.memo {
            info!("  memo: {memo}");
        }
        if !place.photo_refs.is_empty() {
            info!("  {} photo(s)", place.photo_refs.len());
        }
    }
    Ok(())
}

fn update(app: &mut Matzip, id: &PlaceId, changes: PlaceChanges) -> Result<(), CliError> {
    let mut place = app
        .store()
        .place(id)
        .cloned()
        .ok_or_else(|| matzip_client::StoreError::PlaceNotFound(id.clone()))?;

    if let Some(name) = changes.name {
        place.name = name;
    }
    if let Some(date) = changes.date {
        place.visit_date = date;
    }
    if let Some(value) = changes.rating {
        place.rating = rating(value)?;
    }
    if let Some(category) = changes.category {
        place.category = category;
    }
    if let Some(memo) = changes.memo {
        place.memo = Some(memo).filter(|m| !m.is_empty());
    }
    if let Some(address) = changes.address {
        place.address = Some(address).filter(|a| !a.is_empty());
    }

    let summary = describe(&place);
    let updated = app.update_place(place)?;
    info!("Updated {summary}");
    warn_if_unsaved(updated.persisted.is_durable());
    Ok(())
}

fn warn_if_unsaved(durable: bool) {
    if !durable {
        tracing::warn!("Change kept for this run only; it could not be saved to disk.");
    }
}
