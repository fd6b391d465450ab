//! Command-line interface parsing for zipweather
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a `StartupConfig`, including the optional debug override for cache expiry.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::storage::FileStorage;

/// Error types for CLI configuration
#[derive(Debug, Error)]
pub enum CliError {
    /// No --data-dir was given and the platform data directory is unknown
    #[error("Could not determine a data directory; pass --data-dir")]
    NoDataDir,

    /// A command needs the weather API but no key was configured
    #[error("Missing OpenWeatherMap API key; pass --api-key or set OPENWEATHER_API_KEY")]
    MissingApiKey,
}

/// zipweather - current conditions and forecasts for your saved US postal codes
#[derive(Parser, Debug)]
#[command(name = "zipweather")]
#[command(about = "Weather dashboard for saved US postal codes")]
#[command(version)]
pub struct Cli {
    /// Directory holding the saved locations and cached responses
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Override every cache expiration with this many seconds (diagnostics only)
    ///
    /// Values that are not integers are ignored.
    #[arg(
        long,
        value_name = "SECONDS",
        env = "ZIPWEATHER_DEBUG_CACHE_DURATION",
        global = true
    )]
    pub debug_cache_duration: Option<String>,

    /// OpenWeatherMap API key
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Dashboard commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Save one or more postal codes
    Add {
        #[arg(required = true, value_name = "ZIP")]
        zips: Vec<String>,
    },
    /// Remove a saved postal code
    Remove {
        #[arg(value_name = "ZIP")]
        zip: String,
    },
    /// List the saved postal codes
    List,
    /// Show current conditions for every saved postal code
    Show,
    /// Show the five-day forecast for a postal code
    Forecast {
        #[arg(value_name = "ZIP")]
        zip: String,
    },
}

impl Command {
    /// Whether the command talks to the weather API
    pub fn needs_api(&self) -> bool {
        matches!(self, Command::Show | Command::Forecast { .. })
    }
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Where the storage medium lives
    pub data_dir: PathBuf,
    /// Debug override for every cache expiration
    pub debug_expire_in: Option<Duration>,
    /// OpenWeatherMap API key, if configured
    pub api_key: Option<String>,
}

/// Parses a debug cache duration in whole seconds.
///
/// Only the leading integer counts, so `"10s"` is ten seconds and `"1.5"` is
/// one second.
///
/// # Returns
/// * `Some(Duration)` if `s` starts with an integer; negative values clamp to zero
/// * `None` if `s` has no leading digits
pub fn parse_debug_duration(s: &str) -> Option<Duration> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }
    if negative {
        return Some(Duration::ZERO);
    }
    // Too many digits for u64 still means "effectively never"
    let seconds = digits.parse::<u64>().unwrap_or(u64::MAX);
    Some(Duration::from_secs(seconds))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError::NoDataDir)` if no data directory can be determined
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let data_dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => FileStorage::default_dir().ok_or(CliError::NoDataDir)?,
        };

        let debug_expire_in = cli.debug_cache_duration.as_deref().and_then(|raw| {
            let parsed = parse_debug_duration(raw);
            if parsed.is_none() {
                tracing::warn!(value = raw, "ignoring debug cache duration without leading digits");
            }
            parsed
        });

        let api_key = cli.api_key.clone().filter(|key| !key.trim().is_empty());

        Ok(StartupConfig {
            data_dir,
            debug_expire_in,
            api_key,
        })
    }

    /// The API key, or an error for commands that cannot run without it
    pub fn require_api_key(&self) -> Result<&str, CliError> {
        self.api_key.as_deref().ok_or(CliError::MissingApiKey)
    }
}
