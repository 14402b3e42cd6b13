//! Writable data directory.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{DestinationTree, ResourceError};

/// The application-private directory deployed resources are written into.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Create a data directory handle rooted at `root`.  Nothing is created
    /// until the first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root of the data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of the relative `path` inside the data directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl DestinationTree for DataDir {
    fn ensure_dir(&self, path: &Path) -> Result<(), ResourceError> {
        let dir = self.resolve(path);
        std::fs::create_dir_all(&dir).map_err(|e| ResourceError::create_dir(&dir, e))
    }

    fn create_or_truncate(&self, path: &Path) -> Result<Box<dyn Write + '_>, ResourceError> {
        let file_path = self.resolve(path);
        let file = File::create(&file_path).map_err(|e| ResourceError::write(&file_path, e))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn discard(&self, path: &Path) -> Result<(), ResourceError> {
        let file_path = self.resolve(path);
        match std::fs::remove_file(&file_path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                Err(ResourceError::write(&file_path, e))
            }
            _ => Ok(()),
        }
    }
}
