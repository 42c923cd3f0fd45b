//! Subcommand implementations.
//!
//! Output goes through `tracing::info!` so it follows the same filter and
//! formatting as the rest of the logs.

pub mod auth;
pub mod places;
pub mod views;

use matzip_client::{App, AuthError, ClientError, HttpAuthClient, Notice, NoticeLevel};
use matzip_core::Place;
use thiserror::Error;

/// The application type every command runs against.
pub type Matzip = App<HttpAuthClient>;

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CliError {
    /// Client operation failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The auth client could not be built.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Sign-in or sign-up did not go through.
    #[error("{0}")]
    Rejected(String),

    /// Argument failed domain validation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<matzip_client::NavigationError> for CliError {
    fn from(err: matzip_client::NavigationError) -> Self {
        Self::Client(err.into())
    }
}

impl From<matzip_client::StoreError> for CliError {
    fn from(err: matzip_client::StoreError) -> Self {
        Self::Client(err.into())
    }
}

impl CliError {
    /// Forward operational client failures to Sentry.
    pub fn report(&self) {
        if let Self::Client(err) = self {
            err.report();
        }
    }
}

/// Log queued notices; returns the last error message, if any.
pub fn drain_notices(app: &mut Matzip) -> Option<String> {
    let mut last_error = None;
    for Notice { level, message } in app.take_notices() {
        match level {
            NoticeLevel::Success => tracing::info!("{message}"),
            NoticeLevel::Error => {
                tracing::warn!("{message}");
                last_error = Some(message);
            }
        }
    }
    last_error
}

/// One-line summary of a place.
pub fn describe(place: &Place) -> String {
    let mut flags = String::new();
    if place.is_favorite {
        flags.push_str(" ♥");
    }
    if place.is_wishlist {
        flags.push_str(" ☆");
    }
    format!(
        "[{}] {} ({}, {}/5, {}){}",
        place.id,
        place.name,
        place.visit_date,
        place.rating.value(),
        place.category.label(),
        flags
    )
}
