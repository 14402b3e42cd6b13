//! Bounded breadth-first walk of a bundle, shared by deployment and
//! verification.
//!
//! The walker owns the rules both sides must agree on: which entry names are
//! safe, how deep the walk may go, and that a leaf the visitor gives up on
//! is listed again as a directory.  The visitor owns everything else.
use std::collections::VecDeque;
use std::path::{Component, Path, PathBuf};

use crate::resources::{Entry, EntryKind, ResourceError, ResourceTree};

/// A node reached by the walk, with its mirrored destination path.
#[derive(Debug)]
pub(crate) struct Job {
    /// Path in the resource tree.
    pub source: PathBuf,
    /// Path in the destination tree.
    pub dest: PathBuf,
    /// Levels below the bundle root; root children are at depth 1.
    pub depth: usize,
    /// Set when a leaf is being listed again as a directory.
    pub probe: bool,
}

/// An entry the walk did not descend into.
#[derive(Debug)]
pub(crate) enum Skip<'a> {
    /// The listed name is not a single plain path segment.
    UnsafeName {
        /// Directory that listed the name.
        parent: &'a Job,
        /// The offending name.
        name: &'a str,
    },
    /// Descending would go past the depth limit.
    TooDeep(&'a Job),
    /// A directory, or a leaf listed again as one, could not be listed.
    Unlisted(&'a Job, ResourceError),
}

/// Callbacks driven by [`walk`].
pub(crate) trait Visitor {
    /// A directory was listed with `entries` children.  Return `false` to
    /// skip all of them.
    fn enter(&mut self, dir: &Job, entries: usize) -> bool;

    /// Handle a leaf.  Return `true` to list it again as a directory.
    fn leaf(&mut self, leaf: &Job) -> bool;

    /// An entry was not visited.
    fn skip(&mut self, skip: Skip<'_>);
}

/// Walk the directory `source` in `tree`, mirroring paths under `dest`.
///
/// # Errors
///
/// Returns [`ResourceError::List`] if `source` itself cannot be listed;
/// nothing is visited in that case.
pub(crate) fn walk(
    tree: &dyn ResourceTree,
    source: &Path,
    dest: &Path,
    max_depth: usize,
    visitor: &mut dyn Visitor,
) -> Result<(), ResourceError> {
    let entries = tree.list(source)?;
    let root = Job {
        source: source.to_path_buf(),
        dest: dest.to_path_buf(),
        depth: 0,
        probe: false,
    };
    let mut pending = VecDeque::new();
    expand(&root, entries, max_depth, visitor, &mut pending);

    while let Some(job) = pending.pop_front() {
        match tree.list(&job.source) {
            Ok(entries) => expand(&job, entries, max_depth, visitor, &mut pending),
            Err(e) => visitor.skip(Skip::Unlisted(&job, e)),
        }
    }
    Ok(())
}

fn expand(
    dir: &Job,
    entries: Vec<Entry>,
    max_depth: usize,
    visitor: &mut dyn Visitor,
    pending: &mut VecDeque<Job>,
) {
    if !visitor.enter(dir, entries.len()) {
        return;
    }

    for entry in entries {
        if !is_plain_name(&entry.name) {
            visitor.skip(Skip::UnsafeName {
                parent: dir,
                name: &entry.name,
            });
            continue;
        }

        let child = Job {
            source: dir.source.join(&entry.name),
            dest: dir.dest.join(&entry.name),
            depth: dir.depth + 1,
            probe: false,
        };
        let next = match entry.kind {
            EntryKind::Directory => Some(child),
            EntryKind::Leaf => visitor.leaf(&child).then_some(Job {
                probe: true,
                ..child
            }),
        };
        let Some(next) = next else {
            continue;
        };
        if next.depth > max_depth {
            visitor.skip(Skip::TooDeep(&next));
        } else {
            pending.push_back(next);
        }
    }
}

/// Returns `true` if `name` is a single normal path segment.
pub(crate) fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}
