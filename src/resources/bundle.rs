//! Resource tree backed by a read-only directory on disk.
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{Entry, EntryKind, ResourceError, ResourceTree};

/// A packaged bundle laid out as a directory tree on disk.
///
/// Symlinks are followed: a link to a directory is listed as a directory.
#[derive(Debug, Clone)]
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    /// Create a bundle rooted at `root`.  The directory is not checked here;
    /// a missing root surfaces as a listing failure.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the bundle.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl ResourceTree for DirBundle {
    fn list(&self, path: &Path) -> Result<Vec<Entry>, ResourceError> {
        let dir = self.resolve(path);
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| ResourceError::list(path, e))? {
            let entry = entry.map_err(|e| ResourceError::list(path, e))?;
            let kind = if entry.path().is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::Leaf
            };
            entries.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }
        Ok(entries)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Read + '_>, ResourceError> {
        let file = File::open(self.resolve(path)).map_err(|e| ResourceError::open(path, e))?;
        Ok(Box::new(file))
    }
}
