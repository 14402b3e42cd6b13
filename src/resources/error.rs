//! Typed error variants for bundle and data-directory operations.
//!
//! [`ResourceError`] covers both boundaries of a deployment: reading the
//! packaged bundle (list, open, read) and writing the data directory
//! (create directory, create file, write, discard).  The deployer matches on
//! these variants to decide between a fallback probe and a plain skip.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that arise while reading a resource tree or writing a destination tree.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A directory in the resource tree could not be listed.
    #[error("cannot list {}: {source}", .path.display())]
    List {
        /// Path of the directory, relative to the tree root.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A leaf in the resource tree could not be opened as a stream.
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        /// Path of the leaf, relative to the tree root.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A leaf opened successfully but reading its stream failed.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        /// Path of the leaf, relative to the tree root.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A destination directory could not be created.
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        /// Destination directory path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A destination file could not be created, written, or discarded.
    #[error("cannot write {}: {source}", .path.display())]
    Write {
        /// Destination file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Descending into a path would exceed the configured depth limit.
    #[error("{} is deeper than the limit of {limit} levels", .path.display())]
    DepthExceeded {
        /// Path that was not descended into.
        path: PathBuf,
        /// Configured maximum depth.
        limit: usize,
    },
}

impl ResourceError {
    pub(crate) fn list(path: &Path, source: io::Error) -> Self {
        Self::List {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        Self::Open {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn create_dir(path: &Path, source: io::Error) -> Self {
        Self::CreateDir {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns `true` if the error happened on the source (bundle) side.
    ///
    /// Source-side failures on a leaf are the ones worth a fallback probe;
    /// destination-side failures would fail the same way again.
    #[must_use]
    pub const fn is_source_side(&self) -> bool {
        matches!(self, Self::List { .. } | Self::Open { .. } | Self::Read { .. })
    }
}
