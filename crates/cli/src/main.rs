//! Matzip CLI - record restaurant visits from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Create an account, then sign in (sign-up alone issues no token)
//! matzip signup -e me@example.com -p hunter2 -n Minji
//! matzip login -e me@example.com -p hunter2
//!
//! # Record a visit and review the feed
//! matzip place add --name "Kimchi House" --date 2025-11-03 --rating 4 --category red
//! matzip place list --search kimchi
//!
//! # Monthly calendar and taste stats
//! matzip calendar --year 2025 --month 11
//! matzip stats
//! ```
//!
//! # Commands
//!
//! - `login` / `signup` / `logout` / `status` - Session management
//! - `place` - Add, list, update, delete and flag places
//! - `wishlist` - Places saved for later
//! - `calendar` - Visit days in a month, or visits on one day
//! - `stats` - Visit counts, average rating and preferred styles

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};
use matzip_client::{App, AppOptions, ClientConfig, FileStore, HttpAuthClient, PlaceStorage};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::places::PlaceAction;

#[derive(Parser)]
#[command(name = "matzip")]
#[command(author, version, about = "Matzip restaurant journal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to an existing account
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "MATZIP_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create a new account
    Signup {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "MATZIP_PASSWORD", hide_env_values = true)]
        password: String,

        /// Display name (defaults to the part of the email before '@')
        #[arg(short = 'n', long, default_value = "")]
        display_name: String,
    },
    /// Forget the remembered session
    Logout,
    /// Show who is signed in and how much is stored
    Status,
    /// Manage places
    Place {
        #[command(subcommand)]
        action: PlaceAction,
    },
    /// List wishlist entries
    Wishlist,
    /// Show visit days in a month, or the visits on one day
    Calendar {
        /// Year to show
        #[arg(long)]
        year: i32,

        /// Month to show (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,

        /// Day of the month to list visits for
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
        day: Option<u32>,
    },
    /// Show taste statistics
    Stats,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ClientConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Map tracing levels to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "matzip_client=info,matzip_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().without_time().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if let Err(e) = run(cli, &config).await {
        e.report();
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ClientConfig) -> Result<(), commands::CliError> {
    let store = FileStore::new(config.data_dir.clone());
    let auth = HttpAuthClient::new(config.api_url.clone(), config.auth_timeout)?;
    let mut app = App::new(
        auth,
        PlaceStorage::new(Arc::new(store)),
        AppOptions::from(config),
    );
    app.bootstrap();

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&mut app, &email, password).await?;
        }
        Commands::Signup {
            email,
            password,
            display_name,
        } => commands::auth::signup(&mut app, &email, password, &display_name).await?,
        Commands::Logout => commands::auth::logout(&mut app),
        Commands::Status => commands::auth::status(&app),
        Commands::Place { action } => commands::places::run(&mut app, action)?,
        Commands::Wishlist => commands::views::wishlist(&mut app)?,
        Commands::Calendar { year, month, day } => {
            commands::views::calendar(&mut app, year, month, day)?;
        }
        Commands::Stats => commands::views::stats(&mut app)?,
    }
    Ok(())
}
