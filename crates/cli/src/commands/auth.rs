//! Session commands.

use matzip_client::{AuthOutcome, PlaceSource};
use matzip_core::views::Stats;
use secrecy::SecretString;
use tracing::info;

use super::{CliError, Matzip, drain_notices};

/// Sign in and report where the starting data came from.
///
/// # Errors
///
/// Returns `CliError::Rejected` if the service refused the credentials.
pub async fn login(app: &mut Matzip, email: &str, password: String) -> Result<(), CliError> {
    let outcome = app.sign_in(email, SecretString::from(password)).await;
    finish(app, outcome?)
}

/// Register a new account.
///
/// # Errors
///
/// Returns `CliError::Rejected` if the service refused the registration.
pub async fn signup(
    app: &mut Matzip,
    email: &str,
    password: String,
    display_name: &str,
) -> Result<(), CliError> {
    let outcome = app
        .sign_up(email, SecretString::from(password), display_name)
        .await;
    finish(app, outcome?)?;
    info!("Run `matzip login` to keep this session for later commands.");
    Ok(())
}

fn finish(app: &mut Matzip, outcome: AuthOutcome) -> Result<(), CliError> {
    let failure = drain_notices(app);
    match outcome {
        AuthOutcome::Applied(source) => {
            let count = app.store().places().len();
            match source {
                PlaceSource::PerUser => info!("Loaded {count} saved places."),
                PlaceSource::Global => info!("Imported {count} places saved before accounts."),
                PlaceSource::Empty => info!("No places yet."),
            }
            Ok(())
        }
        AuthOutcome::Failed | AuthOutcome::Stale => Err(CliError::Rejected(
            failure.unwrap_or_else(|| "Authentication did not complete".to_string()),
        )),
    }
}

/// Forget the remembered session.
pub fn logout(app: &mut Matzip) {
    app.sign_out();
    info!("Signed out.");
}

/// Report the current session.
pub fn status(app: &Matzip) {
    let Some(session) = app.session() else {
        info!("Not signed in.");
        return;
    };
    let profile = session.profile();
    let stats = Stats::from_places(app.store().places());
    info!("Signed in as {} ({})", profile.nickname, session.identity());
    info!(
        "{} visited, {} on the wishlist",
        stats.visited, stats.wishlisted
    );
}
