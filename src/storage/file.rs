//! File-backed storage medium
//!
//! Stores each key as its own JSON file inside a single directory
//! (`~/.local/share/zipweather/` on Linux).

use directories::ProjectDirs;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

use super::{Storage, StorageError};

/// Bytes escaped in item file names; everything outside `[A-Za-z0-9._-]`
const KEY_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'.').remove(b'_').remove(b'-');

/// Persists storage items to disk, one file per key
///
/// The directory is only created on the first write, so reading from a fresh
/// location never touches the filesystem beyond a failed open. Writes go to a
/// temp file in the same directory that is then renamed over the item, so a
/// reader sees either the old value or the new one.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Directory where item files are stored
    dir: PathBuf,
}

impl FileStorage {
    /// Creates a FileStorage rooted at a custom directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The XDG data directory used when no explicit directory is given
    ///
    /// Returns `None` if it cannot be determined (e.g., no home directory).
    pub fn default_dir() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "zipweather")?;
        Some(project_dirs.data_dir().to_path_buf())
    }

    /// Returns the path of the file backing `key`
    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_key(key)))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.item_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(self.item_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Maps any key to a safe, collision-free file name stem
fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_SET).to_string()
}
