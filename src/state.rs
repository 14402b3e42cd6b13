//! Persisted deployment flag.
//!
//! The flag that gates a deployment is an explicit capability passed to the
//! deployer rather than ambient global storage.  Production code uses
//! [`JsonFlagStore`], a small JSON document of named booleans inside the data
//! directory; tests use [`MemoryFlagStore`] or the generated `MockFlagStore`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::StateError;

/// Key-value store of named boolean flags scoped to one installation.
#[cfg_attr(test, mockall::automock)]
pub trait FlagStore {
    /// Read the flag under `key`.  An absent flag reads as `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store exists but cannot be read.
    fn get(&self, key: &str) -> Result<bool, StateError>;

    /// Persist `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: bool) -> Result<(), StateError>;
}

/// [`FlagStore`] persisted as a JSON object in a single file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// original, so a crash mid-write never leaves a truncated document.
#[derive(Debug, Clone)]
pub struct JsonFlagStore {
    path: PathBuf,
}

impl JsonFlagStore {
    /// Create a store backed by the file at `path`.  The file and its parent
    /// directory are created on the first [`FlagStore::set`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, bool>, StateError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| StateError::Corrupted {
            path: self.path.clone(),
            source,
        })
    }
}

impl FlagStore for JsonFlagStore {
    fn get(&self, key: &str) -> Result<bool, StateError> {
        Ok(self.load()?.get(key).copied().unwrap_or(false))
    }

    fn set(&self, key: &str, value: bool) -> Result<(), StateError> {
        // A corrupted document is replaced rather than blocking every future run.
        let mut flags = match self.load() {
            Err(StateError::Corrupted { .. }) => BTreeMap::new(),
            other => other?,
        };
        flags.insert(key.to_string(), value);

        let write_err = |source: std::io::Error| StateError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(&flags)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)
    }
}

/// In-memory [`FlagStore`] that also counts writes.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: Mutex<BTreeMap<String, bool>>,
    writes: AtomicUsize,
}

impl MemoryFlagStore {
    /// Create an empty store (every flag reads as `false`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of [`FlagStore::set`] calls made so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: &str) -> Result<bool, StateError> {
        let flags = self
            .flags
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(flags.get(key).copied().unwrap_or(false))
    }

    fn set(&self, key: &str, value: bool) -> Result<(), StateError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.flags
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }
}
