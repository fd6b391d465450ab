//! Key-value storage medium
//!
//! A small string-to-string store with local-storage semantics. The cache and
//! the location list both persist through it, namespaced only by key.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::fmt;
use thiserror::Error;

/// Errors raised by a storage medium
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the medium failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized for storage
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A synchronous key-value medium shared by every caller in the process
pub trait Storage: Send + Sync + fmt::Debug {
    /// Returns the raw value stored under `key`, or `None` if there is none
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
