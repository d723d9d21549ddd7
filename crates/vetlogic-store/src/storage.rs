//! Durable key-value storage for save blobs.
//!
//! # Backends
//!
//! - [`FileStorage`] -- one `<key>.json` file per key under a directory
//! - [`MemoryStorage`] -- in-process map, for tests and ephemeral play

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;

/// A string-keyed store of string blobs.
pub trait SaveStorage: Send + Sync {
    /// Read the blob under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the blob under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the blob under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous save intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a backend rooted at `dir`. The directory is created on first
    /// write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SaveStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(io_error(&tmp))?;
        fs::rename(&tmp, &path).map_err(io_error(&path))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Memory backend
// ---------------------------------------------------------------------------

/// Keeps blobs in a process-local map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one blob.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(key.to_owned(), value.to_owned());
        Self {
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

impl SaveStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

impl<T: SaveStorage + ?Sized> SaveStorage for std::sync::Arc<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vetlogic-store-{name}-{}", std::process::id()))
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn file_roundtrip_and_remove() {
        let dir = temp_dir("roundtrip");
        let storage = FileStorage::new(&dir);
        assert_eq!(storage.read("slot").unwrap(), None);

        storage.write("slot", "{\"money\":1}").unwrap();
        assert_eq!(storage.read("slot").unwrap().as_deref(), Some("{\"money\":1}"));

        storage.remove("slot").unwrap();
        storage.remove("slot").unwrap();
        assert_eq!(storage.read("slot").unwrap(), None);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn file_rejects_path_like_keys() {
        let storage = FileStorage::new(temp_dir("keys"));
        assert!(matches!(
            storage.read("../etc/passwd"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(storage.write("", "x").is_err());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn memory_backend() {
        let storage = MemoryStorage::with_entry("a", "1");
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("1"));
        storage.write("a", "2").unwrap();
        assert_eq!(storage.read("a").unwrap().as_deref(), Some("2"));
        storage.remove("a").unwrap();
        assert_eq!(storage.read("a").unwrap(), None);
    }
}
