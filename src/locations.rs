//! Persisted list of the user's locations
//!
//! The list lives under the `locations` storage key as a JSON array of postal
//! codes and is rewritten in full on every change. Subscribers are notified
//! through a `tokio::sync::watch` channel.

use std::sync::Arc;
use tokio::sync::watch;

use crate::storage::{Storage, StorageError};

/// Storage key holding the location list
pub const LOCATIONS_KEY: &str = "locations";

/// Storage key an unreadable location list is copied to before it is replaced
pub const LOCATIONS_BACKUP_KEY: &str = "locations.corrupt";

/// The user's ordered list of postal codes
///
/// Duplicates are allowed; `add` always appends.
#[derive(Debug)]
pub struct LocationStore {
    storage: Arc<dyn Storage>,
    locations: watch::Sender<Vec<String>>,
}

impl LocationStore {
    /// Loads the persisted list, starting empty if it is missing or unreadable
    ///
    /// An unparseable list is copied to `LOCATIONS_BACKUP_KEY` first, so the
    /// next `add` or `remove` does not destroy the only copy of it.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let initial = match storage.get_item(LOCATIONS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    backup = LOCATIONS_BACKUP_KEY,
                    "ignoring corrupt location list"
                );
                if let Err(e) = storage.set_item(LOCATIONS_BACKUP_KEY, &raw) {
                    tracing::warn!(error = %e, "failed to back up corrupt location list");
                }
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read location list");
                Vec::new()
            }
        };
        let (locations, _) = watch::channel(initial);
        Self { storage, locations }
    }

    /// A snapshot of the current list
    pub fn locations(&self) -> Vec<String> {
        self.locations.borrow().clone()
    }

    /// Subscribes to the list; the receiver sees every later change
    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.locations.subscribe()
    }

    /// Appends `zip`, persists the list and notifies subscribers
    pub fn add(&self, zip: &str) -> Result<(), StorageError> {
        let mut locations = self.locations();
        locations.push(zip.to_string());
        self.publish(locations)
    }

    /// Removes the first occurrence of `zip`
    ///
    /// Returns `Ok(false)` without touching storage when `zip` is not listed.
    pub fn remove(&self, zip: &str) -> Result<bool, StorageError> {
        let mut locations = self.locations();
        let Some(index) = locations.iter().position(|l| l == zip) else {
            return Ok(false);
        };
        locations.remove(index);
        self.publish(locations)?;
        Ok(true)
    }

    fn publish(&self, locations: Vec<String>) -> Result<(), StorageError> {
        let json = serde_json::to_string(&locations)?;
        self.storage.set_item(LOCATIONS_KEY, &json)?;
        self.locations.send_replace(locations);
        Ok(())
    }
}
