//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MATZIP_API_URL` - Base URL of the authentication service
//!
//! ## Optional
//! - `MATZIP_DATA_DIR` - Directory for the file-backed store (default: .matzip)
//! - `MATZIP_AUTH_TIMEOUT_SECS` - Auth request timeout in seconds (default: 10)
//! - `MATZIP_MIGRATION_POLICY` - `global-fallback` or `per-user-only` (default: global-fallback)
//! - `MATZIP_CASCADE_DELETES` - Prune collection members on place delete (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::session::MigrationPolicy;
use crate::store::CascadePolicy;

const DEFAULT_DATA_DIR: &str = ".matzip";
const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Authentication service base URL
    pub api_url: Url,
    /// Directory the file-backed store writes to
    pub data_dir: PathBuf,
    /// Per-request timeout for authentication calls
    pub auth_timeout: Duration,
    /// Whether global-scope data is adopted at sign-in
    pub migration: MigrationPolicy,
    /// Collection behavior when a place is deleted
    pub cascade: CascadePolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let api_url = env.required("MATZIP_API_URL")?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("MATZIP_API_URL".to_string(), e.to_string()))?;

        let data_dir = PathBuf::from(env.or_default("MATZIP_DATA_DIR", DEFAULT_DATA_DIR));

        let auth_timeout = env
            .or_default("MATZIP_AUTH_TIMEOUT_SECS", &DEFAULT_AUTH_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("MATZIP_AUTH_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if auth_timeout == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "MATZIP_AUTH_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let migration = env
            .or_default("MATZIP_MIGRATION_POLICY", "global-fallback")
            .parse::<MigrationPolicy>()
            .map_err(|e| ConfigError::InvalidEnvVar("MATZIP_MIGRATION_POLICY".to_string(), e))?;

        let cascade = match env.or_default("MATZIP_CASCADE_DELETES", "false").as_str() {
            "true" | "1" => CascadePolicy::Prune,
            "false" | "0" => CascadePolicy::Retain,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "MATZIP_CASCADE_DELETES".to_string(),
                    format!("expected true or false, got '{other}'"),
                ));
            }
        };

        Ok(Self {
            api_url,
            data_dir,
            auth_timeout: Duration::from_secs(auth_timeout),
            migration,
            cascade,
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get a required environment variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional environment variable. Blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}
