//! Dashboard state: the current conditions for every saved location
//!
//! Derives one `ConditionsAndZip` per distinct listed postal code, fetching through the
//! response cache, and keeps the location list clean of codes the weather API
//! rejects.

use std::time::Duration;
use tokio::sync::watch;

use crate::cache::{cached, CachePolicy, CacheStore};
use crate::data::{ConditionsAndZip, Forecast, WeatherError, WeatherSource};
use crate::locations::LocationStore;

/// How long fetched conditions and forecasts stay cached (2 hours)
pub const WEATHER_EXPIRE_IN: Duration = Duration::from_secs(7200);

/// Cache key for the current conditions of a postal code
pub fn conditions_cache_key(zip: &str) -> String {
    format!("weather-{}", zip)
}

/// Cache key for the daily forecast of a postal code
pub fn forecast_cache_key(zip: &str) -> String {
    format!("daily-forecast-{}", zip)
}

/// What a `sync` changed
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Postal codes whose conditions were fetched
    pub added: Vec<String>,
    /// Postal codes dropped because they left the location list
    pub dropped: Vec<String>,
    /// Postal codes removed from the location list because the API rejected them
    pub invalid: Vec<String>,
    /// Postal codes whose fetch failed for another reason; they stay listed
    pub failed: Vec<(String, WeatherError)>,
}

/// Current conditions for the saved locations
pub struct Dashboard<S> {
    source: S,
    cache: CacheStore,
    locations: LocationStore,
    watched: watch::Receiver<Vec<String>>,
    conditions: Vec<ConditionsAndZip>,
}

impl<S: WeatherSource> Dashboard<S> {
    pub fn new(source: S, cache: CacheStore, locations: LocationStore) -> Self {
        let watched = locations.subscribe();
        Self {
            source,
            cache,
            locations,
            watched,
            conditions: Vec::new(),
        }
    }

    /// The conditions derived by the last `sync`, in fetch order
    pub fn conditions(&self) -> &[ConditionsAndZip] {
        &self.conditions
    }

    pub fn locations(&self) -> &LocationStore {
        &self.locations
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Replaces every cache expiration used by later fetches; `None` restores the defaults
    pub fn set_debug_expiration(&mut self, expire_in: Option<Duration>) {
        self.cache.set_debug_expiration(expire_in);
    }

    /// Brings the conditions in line with the location list
    ///
    /// Conditions for codes no longer listed are dropped, and every listed code
    /// without conditions is fetched through the cache. A code listed twice
    /// still gets a single entry, which stays while any occurrence remains.
    /// A code the API answers with 400 or 404 is removed from the location list.
    pub async fn sync(&mut self) -> SyncReport {
        let mut report = SyncReport::default();
        let listed = self.watched.borrow_and_update().clone();

        self.conditions.retain(|c| {
            let keep = listed.contains(&c.zip);
            if !keep {
                report.dropped.push(c.zip.clone());
            }
            keep
        });

        let mut missing: Vec<String> = Vec::new();
        for zip in &listed {
            let known = self.conditions.iter().any(|c| &c.zip == zip);
            if !known && !missing.contains(zip) {
                missing.push(zip.clone());
            }
        }

        let source = &self.source;
        let cache = &self.cache;
        let fetches = missing.iter().map(|zip| async move {
            let policy = CachePolicy::new(conditions_cache_key(zip)).expire_in(WEATHER_EXPIRE_IN);
            cached(cache, &policy, || source.current_conditions(zip)).await
        });
        let results = futures::future::join_all(fetches).await;

        for (zip, result) in missing.into_iter().zip(results) {
            match result {
                Ok(data) => {
                    report.added.push(zip.clone());
                    self.conditions.push(ConditionsAndZip { zip, data });
                }
                Err(e) if e.is_invalid_location() => {
                    tracing::info!(%zip, error = %e, "removing location rejected by weather API");
                    if let Err(e) = self.locations.remove(&zip) {
                        tracing::warn!(%zip, error = %e, "failed to persist location removal");
                    }
                    report.invalid.push(zip);
                }
                Err(e) => {
                    tracing::warn!(%zip, error = %e, "failed to fetch current conditions");
                    report.failed.push((zip, e));
                }
            }
        }

        // Our own removals are already reflected in `conditions`
        self.watched.borrow_and_update();
        report
    }

    /// The daily forecast for `zip`, served from the cache when fresh
    pub async fn forecast(&self, zip: &str) -> Result<Forecast, WeatherError> {
        let policy = CachePolicy::new(forecast_cache_key(zip)).expire_in(WEATHER_EXPIRE_IN);
        cached(&self.cache, &policy, || self.source.daily_forecast(zip)).await
    }
}
