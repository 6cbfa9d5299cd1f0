//! Storage port and its backends
//!
//! [`KvBackend`] is a flat string-to-string map with synchronous,
//! immediately visible operations. Two implementations:
//! - [`MemoryBackend`]: in-process map with an optional byte quota
//! - [`FileBackend`]: the whole map persisted as one JSON document

use crate::error::{Result, StoreError};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Flat string-keyed record storage
pub trait KvBackend: Send + Sync {
    /// Raw value stored under `key`
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    ///
    /// # Errors
    /// A failed write leaves the previous value in place.
    fn set_raw(&self, key: &str, value: String) -> Result<()>;

    /// Delete `key`; deleting a missing key succeeds
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] when the change cannot be persisted.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys, sorted
    fn keys(&self) -> Vec<String>;
}

impl<B: KvBackend + ?Sized> KvBackend for Arc<B> {
    fn get_raw(&self, key: &str) -> Option<String> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: String) -> Result<()> {
        (**self).set_raw(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

fn footprint(entries: &BTreeMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// In-memory backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    /// Unbounded backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total bytes of keys plus values
    #[must_use]
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Bytes currently used by keys and values
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        footprint(&self.entries.lock())
    }
}

impl KvBackend for MemoryBackend {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.lock();
        if let Some(limit) = self.quota {
            let current = footprint(&entries);
            let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
            let needed = current - replaced + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}

/// Backend persisting the whole map to a JSON file
///
/// Every write rewrites the file through a temporary sibling and a rename.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileBackend {
    /// Open or create the store at `path`
    ///
    /// A missing file starts empty. A corrupt file is logged and also starts
    /// empty; it is overwritten by the next write.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] when the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::error!(path = %path.display(), %error, "corrupt store file, starting empty");
                    BTreeMap::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => return Err(error.into()),
        };
        tracing::debug!(path = %path.display(), records = entries.len(), "opened store file");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl KvBackend for FileBackend {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.lock();
        let previous = entries.insert(key.to_string(), value);
        if let Err(error) = self.persist(&entries) {
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(error);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        let Some(previous) = entries.remove(key) else {
            return Ok(());
        };
        if let Err(error) = self.persist(&entries) {
            entries.insert(key.to_string(), previous);
            return Err(error);
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}
