//! Cache store for persisting API responses in the storage medium
//!
//! Provides a `CacheStore` that wraps serializable values with their creation
//! timestamp and filters them by age at read time.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::clock::{Clock, SystemClock};
use crate::storage::{Storage, StorageError};

/// Prefix of every storage key owned by the cache
pub const CACHE_KEY_PREFIX: &str = "CACHE.";

/// Wrapper struct for cached values stored in the medium
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry<T> {
    /// The cached value
    value: T,
    /// When the value was cached
    creation_date: DateTime<Utc>,
}

/// Reads and writes cached values with expiry checked on read
///
/// Entries are never deleted here: an expired entry simply reads as a miss
/// until the next `set` overwrites it. The debug override belongs to the
/// store value, so it is changed through whoever owns the store.
#[derive(Debug)]
pub struct CacheStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    /// Replaces every caller-supplied expiration when set
    debug_expire_in: Option<Duration>,
}

impl CacheStore {
    /// Creates a CacheStore over `storage` using the system clock and no debug override
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            debug_expire_in: None,
        }
    }

    /// Uses `clock` instead of the system clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Seeds the debug expiration override
    pub fn with_debug_expiration(mut self, expire_in: Option<Duration>) -> Self {
        self.debug_expire_in = expire_in;
        self
    }

    /// Overrides the expiration used by every subsequent `get`
    ///
    /// Meant for diagnostics only. `None` restores the per-call durations.
    pub fn set_debug_expiration(&mut self, expire_in: Option<Duration>) {
        tracing::info!(?expire_in, "cache debug expiration changed");
        self.debug_expire_in = expire_in;
    }

    /// The current debug expiration override, if any
    pub fn debug_expiration(&self) -> Option<Duration> {
        self.debug_expire_in
    }

    /// Returns the storage key for a cache key
    pub fn storage_key(key: &str) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, key)
    }

    /// Caches `value` under `key`, stamped with the current time
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if serialization or the storage medium fails
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let entry = CacheEntry {
            value,
            creation_date: self.clock.now(),
        };
        let json = serde_json::to_string(&entry)?;
        self.storage.set_item(&Self::storage_key(key), &json)
    }

    /// Reads the value cached under `key`
    ///
    /// Returns `None` when the entry is missing, expired, unreadable, or does
    /// not parse as a `T`. The effective expiration is the debug override if
    /// set, else `expire_in`; with neither, entries never expire.
    pub fn get<T: DeserializeOwned>(&self, key: &str, expire_in: Option<Duration>) -> Option<T> {
        let storage_key = Self::storage_key(key);
        let raw = match self.storage.get_item(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(key, error = %e, "corrupt cache entry, treating as miss");
                return None;
            }
        };

        let expire_in = self.debug_expire_in.or(expire_in);
        if !is_fresh(entry.creation_date, expire_in, self.clock.now()) {
            tracing::debug!(key, created = %entry.creation_date, "cache entry expired");
            return None;
        }

        tracing::debug!(key, "cache hit");
        Some(entry.value)
    }
}

/// Whether an entry created at `created` is still valid at `now`
///
/// `None` never expires and a zero duration is always expired. A duration too
/// large to represent is treated as never expiring.
fn is_fresh(created: DateTime<Utc>, expire_in: Option<Duration>, now: DateTime<Utc>) -> bool {
    let Some(expire_in) = expire_in else {
        return true;
    };
    match chrono::Duration::from_std(expire_in)
        .ok()
        .and_then(|ttl| created.checked_add_signed(ttl))
    {
        Some(expires_at) => now < expires_at,
        None => true,
    }
}
