//! Input and output boundaries of a deployment.
//!
//! A deployment reads from a [`ResourceTree`] (the read-only packaged
//! bundle) and writes into a [`DestinationTree`] (the writable,
//! application-private data directory).  Both are traits so the deployer
//! can be exercised against in-memory trees and failure-injecting doubles.
pub mod bundle;
pub mod error;
pub mod fs;
pub mod memory;

use std::io::{Read, Write};
use std::path::Path;

pub use bundle::DirBundle;
pub use error::ResourceError;
pub use fs::DataDir;
pub use memory::MemoryTree;

/// Kind of a node in a resource tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A node with named children.
    Directory,
    /// An opaque byte stream.
    Leaf,
}

/// A named child returned by [`ResourceTree::list`].
///
/// # Examples
///
/// ```
/// use bundle_deploy::resources::{Entry, EntryKind};
///
/// let voice = Entry::leaf("voice.data");
/// assert!(voice.is_leaf());
/// assert_eq!(Entry::directory("voices").kind, EntryKind::Directory);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// File name of the child (a single path segment).
    pub name: String,
    /// Whether the child is a directory or a leaf.
    pub kind: EntryKind,
}

impl Entry {
    /// Create a leaf entry.
    #[must_use]
    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Leaf,
        }
    }

    /// Create a directory entry.
    #[must_use]
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }

    /// Returns `true` if this entry is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.kind == EntryKind::Leaf
    }
}

/// Read-only hierarchical store of packaged resources.
///
/// Paths are relative to the tree root; the empty path names the root
/// itself.  Listing order carries no meaning.
pub trait ResourceTree: std::fmt::Debug {
    /// List the immediate children of the directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::List`] if `path` is missing, is not a
    /// directory, or cannot be read.
    fn list(&self, path: &Path) -> Result<Vec<Entry>, ResourceError>;

    /// Open the leaf at `path` as a byte stream.
    ///
    /// The stream is closed when the returned box is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Open`] if the leaf cannot be opened.
    fn open(&self, path: &Path) -> Result<Box<dyn Read + '_>, ResourceError>;
}

/// Writable destination for deployed resources.
///
/// Paths are relative to the destination root.
pub trait DestinationTree: std::fmt::Debug {
    /// Ensure a directory exists at `path`, creating missing ancestors.
    ///
    /// An existing directory is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::CreateDir`] if the directory cannot be created.
    fn ensure_dir(&self, path: &Path) -> Result<(), ResourceError>;

    /// Create the file at `path`, truncating it if it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Write`] if the file cannot be created.
    fn create_or_truncate(&self, path: &Path) -> Result<Box<dyn Write + '_>, ResourceError>;

    /// Remove a partially written file at `path`.  Missing files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Write`] if the file exists but cannot be removed.
    fn discard(&self, path: &Path) -> Result<(), ResourceError>;
}
