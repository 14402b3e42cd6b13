//! In-memory resource tree.
//!
//! [`MemoryTree`] holds a whole bundle in memory: useful for resources
//! compiled into the binary and as a failure-injecting double in tests.
use std::collections::{BTreeMap, HashSet};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Entry, EntryKind, ResourceError, ResourceTree};

#[derive(Debug, Clone)]
enum Node {
    Dir,
    Leaf(Vec<u8>),
    /// Listed as a leaf, but opening it fails.
    Unreadable,
    /// Opens, yields the stored prefix, then fails.
    Broken(Vec<u8>),
    /// Listed as a leaf by its parent, fails to open, but can be listed.
    Opaque,
}

/// Read-only resource tree held in memory.
///
/// Ancestor directories are created implicitly by the builder methods.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use bundle_deploy::resources::{MemoryTree, ResourceTree};
///
/// let tree = MemoryTree::new()
///     .with_leaf("a", b"x")
///     .with_leaf("b/c", b"yz");
/// assert_eq!(tree.list(Path::new("b")).unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryTree {
    nodes: BTreeMap<PathBuf, Node>,
    unlistable: HashSet<PathBuf>,
    opens: AtomicUsize,
    listed: Mutex<Vec<PathBuf>>,
}

impl MemoryTree {
    /// Create an empty tree (the root directory exists and has no children).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a leaf holding `data`.
    #[must_use]
    pub fn with_leaf(self, path: &str, data: &[u8]) -> Self {
        self.insert(path, Node::Leaf(data.to_vec()))
    }

    /// Add an empty directory.
    #[must_use]
    pub fn with_dir(self, path: &str) -> Self {
        self.insert(path, Node::Dir)
    }

    /// Add a leaf that is listed by its parent but cannot be opened.
    #[must_use]
    pub fn with_unreadable_leaf(self, path: &str) -> Self {
        self.insert(path, Node::Unreadable)
    }

    /// Add a leaf whose stream yields `prefix` and then fails.
    #[must_use]
    pub fn with_broken_leaf(self, path: &str, prefix: &[u8]) -> Self {
        self.insert(path, Node::Broken(prefix.to_vec()))
    }

    /// Add a directory that its parent reports as a leaf.
    ///
    /// Opening it fails; listing it succeeds.  Children are added with the
    /// other builder methods.
    #[must_use]
    pub fn with_opaque_dir(self, path: &str) -> Self {
        self.insert(path, Node::Opaque)
    }

    /// Make listing the directory at `path` fail.  `""` names the root.
    #[must_use]
    pub fn with_unlistable(mut self, path: &str) -> Self {
        self.unlistable.insert(PathBuf::from(path));
        self
    }

    /// Number of [`ResourceTree::open`] calls made so far.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Paths passed to [`ResourceTree::list`] so far, in call order.
    #[must_use]
    pub fn listed_paths(&self) -> Vec<PathBuf> {
        self.listed
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |g| g.clone())
    }

    fn insert(mut self, path: &str, node: Node) -> Self {
        let path = PathBuf::from(path);
        let mut ancestor = path.parent();
        while let Some(dir) = ancestor {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.nodes.entry(dir.to_path_buf()).or_insert(Node::Dir);
            ancestor = dir.parent();
        }
        self.nodes.insert(path, node);
        self
    }

    fn is_listable(&self, path: &Path) -> bool {
        path.as_os_str().is_empty() || matches!(self.nodes.get(path), Some(Node::Dir | Node::Opaque))
    }
}

impl ResourceTree for MemoryTree {
    fn list(&self, path: &Path) -> Result<Vec<Entry>, ResourceError> {
        if let Ok(mut listed) = self.listed.lock() {
            listed.push(path.to_path_buf());
        }
        if self.unlistable.contains(path) {
            return Err(ResourceError::list(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "listing refused"),
            ));
        }
        if !self.is_listable(path) {
            return Err(ResourceError::list(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no such directory"),
            ));
        }
        Ok(self
            .nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .filter_map(|(p, node)| {
                let name = p.file_name()?.to_string_lossy().into_owned();
                let kind = match node {
                    Node::Dir => EntryKind::Directory,
                    _ => EntryKind::Leaf,
                };
                Some(Entry { name, kind })
            })
            .collect())
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Read + '_>, ResourceError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        match self.nodes.get(path) {
            Some(Node::Leaf(data)) => Ok(Box::new(data.as_slice())),
            Some(Node::Broken(prefix)) => Ok(Box::new(prefix.as_slice().chain(FailingReader))),
            Some(Node::Unreadable) => Err(ResourceError::open(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "unreadable leaf"),
            )),
            Some(Node::Dir | Node::Opaque) => Err(ResourceError::open(
                path,
                io::Error::other("not a leaf"),
            )),
            None => Err(ResourceError::open(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no such leaf"),
            )),
        }
    }
}

/// Reader that fails on every call.
struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream truncated"))
    }
}
