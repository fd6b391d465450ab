//! zipweather - weather dashboard for saved US postal codes
//!
//! Keeps a list of postal codes and shows their current conditions and daily
//! forecasts, caching API responses in the data directory.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use zipweather::cache::CacheStore;
use zipweather::cli::{Cli, Command, StartupConfig};
use zipweather::dashboard::Dashboard;
use zipweather::data::OpenWeatherClient;
use zipweather::display::{format_conditions, format_forecast};
use zipweather::locations::LocationStore;
use zipweather::storage::{FileStorage, Storage};

/// Installs the log subscriber; `RUST_LOG` overrides the default `warn` level
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StartupConfig::from_cli(&cli)?;
    tracing::debug!(
        data_dir = ?config.data_dir,
        debug_expire_in = ?config.debug_expire_in,
        "starting"
    );

    let storage: Arc<dyn Storage> = Arc::new(FileStorage::with_dir(&config.data_dir));
    let cache = CacheStore::new(storage.clone()).with_debug_expiration(config.debug_expire_in);
    let locations = LocationStore::load(storage);

    if !cli.command.needs_api() {
        return run_offline(&cli.command, &locations);
    }

    let client = OpenWeatherClient::new(config.require_api_key()?);
    let mut dashboard = Dashboard::new(client, cache, locations);

    match &cli.command {
        Command::Show => {
            let report = dashboard.sync().await;
            for zip in &report.invalid {
                eprintln!("Removed unknown postal code {}", zip);
            }
            for (zip, e) in &report.failed {
                eprintln!("Could not fetch conditions for {}: {}", zip, e);
            }
            if dashboard.conditions().is_empty() && report.failed.is_empty() {
                println!("No saved locations. Add one with `zipweather add <ZIP>`.");
            }
            for conditions in dashboard.conditions() {
                println!("{}", format_conditions(conditions));
            }
        }
        Command::Forecast { zip } => {
            let forecast = dashboard.forecast(zip).await?;
            for line in format_forecast(zip, &forecast) {
                println!("{}", line);
            }
        }
        Command::Add { .. } | Command::Remove { .. } | Command::List => {}
    }

    Ok(())
}

/// Commands that only touch the saved location list
fn run_offline(command: &Command, locations: &LocationStore) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Add { zips } => {
            for zip in zips {
                locations.add(zip)?;
                println!("Added {}", zip);
            }
        }
        Command::Remove { zip } => {
            if locations.remove(zip)? {
                println!("Removed {}", zip);
            } else {
                eprintln!("{} is not a saved location", zip);
            }
        }
        Command::List => {
            for zip in locations.locations() {
                println!("{}", zip);
            }
        }
        Command::Show | Command::Forecast { .. } => {}
    }
    Ok(())
}
