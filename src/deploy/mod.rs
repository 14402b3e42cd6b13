//! One-time extraction of packaged bundles into the data directory.
//!
//! [`ResourceDeployer::deploy`] checks the persisted flag, extracts every
//! configured [`Bundle`], and sets the flag once every bundle root could be
//! listed.  Failures below a bundle root never abort the deployment: a leaf
//! that cannot be read is probed as a directory (the *fallback probe*), and
//! anything that still fails is logged and skipped.
//!
//! Extraction is driven by the breadth-first walk in [`walk`], with every
//! descent (directory or probe) bounded by [`DeployOptions::max_depth`].

mod copy;
mod report;
pub(crate) mod walk;

pub use copy::{Copied, CopyFailure};
pub use report::DeployReport;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::Config;
use crate::logging::{Log, bundle_span};
use crate::resources::{DestinationTree, ResourceError, ResourceTree};
use crate::state::FlagStore;
use walk::{Job, Skip, Visitor};

/// A bundle root and where it is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bundle {
    /// Directory in the resource tree, relative to its root.
    pub source: PathBuf,
    /// Directory in the destination tree, relative to its root.
    pub destination: PathBuf,
}

impl Bundle {
    /// Create a bundle mapping `source` to `destination`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

/// Knobs for a single deployment run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Key of the deployment flag in the [`FlagStore`].
    pub flag_key: String,
    /// Size of the fixed copy buffer in bytes.
    pub buffer_size: usize,
    /// Maximum levels descended below a bundle root.
    pub max_depth: usize,
    /// Read everything, write nothing, never set the flag.
    pub dry_run: bool,
    /// Ignore an already-set flag.
    pub force: bool,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl DeployOptions {
    /// Options taken from `config`, with `dry_run` and `force` off.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            flag_key: config.state.key.clone(),
            buffer_size: config.copy.buffer_size,
            max_depth: config.copy.max_depth,
            dry_run: false,
            force: false,
        }
    }
}

/// Result of [`ResourceDeployer::deploy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    /// The flag was already set; nothing was read or written.
    AlreadyDeployed,
    /// Every bundle root was listed and the flag was set.
    Completed(DeployReport),
    /// At least one bundle root could not be listed; the flag was left
    /// unset so the next run tries again.
    Incomplete {
        /// Counters for the bundles that could be listed.
        report: DeployReport,
        /// Sources of the bundles whose root could not be listed.
        unlisted: Vec<PathBuf>,
    },
    /// Dry run: every bundle was walked and read, nothing was written.
    DryRun(DeployReport),
}

impl DeployOutcome {
    /// Counters of the run, if any extraction happened.
    #[must_use]
    pub const fn report(&self) -> Option<&DeployReport> {
        match self {
            Self::AlreadyDeployed => None,
            Self::Completed(report) | Self::DryRun(report) | Self::Incomplete { report, .. } => {
                Some(report)
            }
        }
    }
}

/// Extracts bundles from a [`ResourceTree`] into a [`DestinationTree`],
/// gated by a flag in a [`FlagStore`].
pub struct ResourceDeployer<'a> {
    source: &'a dyn ResourceTree,
    dest: &'a dyn DestinationTree,
    flags: &'a dyn FlagStore,
    log: &'a dyn Log,
    opts: DeployOptions,
}

impl std::fmt::Debug for ResourceDeployer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDeployer")
            .field("source", &self.source)
            .field("dest", &self.dest)
            .field("flags", &"<dyn FlagStore>")
            .field("log", &"<dyn Log>")
            .field("opts", &self.opts)
            .finish()
    }
}

impl<'a> ResourceDeployer<'a> {
    /// Create a deployer over the given boundaries.
    #[must_use]
    pub fn new(
        source: &'a dyn ResourceTree,
        dest: &'a dyn DestinationTree,
        flags: &'a dyn FlagStore,
        log: &'a dyn Log,
        opts: DeployOptions,
    ) -> Self {
        Self {
            source,
            dest,
            flags,
            log,
            opts,
        }
    }

    /// Deploy `bundles` unless the flag says this already happened.
    ///
    /// Safe to call on every start: once the flag is set this is a single
    /// flag read.  An unreadable flag is treated as unset.  Never fails;
    /// everything that goes wrong is logged and reflected in the outcome.
    pub fn deploy(&self, bundles: &[Bundle]) -> DeployOutcome {
        let key = self.opts.flag_key.as_str();
        if self.opts.force {
            self.log.debug("ignoring deployment flag (forced)");
        } else {
            match self.flags.get(key) {
                Ok(true) => {
                    self.log.debug(&format!("flag '{key}' is set, nothing to deploy"));
                    return DeployOutcome::AlreadyDeployed;
                }
                Ok(false) => {}
                Err(e) => self.log.warn(&format!("{e}; deploying again")),
            }
        }

        let mut report = DeployReport::default();
        let mut unlisted = Vec::new();
        for bundle in bundles {
            let _bundle = bundle_span(&bundle.source).entered();
            self.log.debug(&format!(
                "extracting {} -> {}",
                bundle.source.display(),
                bundle.destination.display()
            ));
            match self.extract(&bundle.source, &bundle.destination) {
                Ok(bundle_report) => report.merge(&bundle_report),
                Err(e) => {
                    self.log.error(&format!("bundle not deployed: {e}"));
                    unlisted.push(bundle.source.clone());
                }
            }
        }

        if !unlisted.is_empty() {
            return DeployOutcome::Incomplete { report, unlisted };
        }
        if self.opts.dry_run {
            self.log.dry_run(&format!("would set flag '{key}'"));
            return DeployOutcome::DryRun(report);
        }
        if let Err(e) = self.flags.set(key, true) {
            self.log
                .warn(&format!("deployment finished but the flag was not saved: {e}"));
        }
        DeployOutcome::Completed(report)
    }

    /// Mirror the directory `source` into `dest`.
    ///
    /// Only a failure to list `source` itself is returned; everything below
    /// it is best-effort and recorded in the report.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::List`] if `source` cannot be listed.
    pub fn extract(&self, source: &Path, dest: &Path) -> Result<DeployReport, ResourceError> {
        let mut extraction = Extraction {
            deployer: self,
            report: DeployReport::default(),
        };
        walk::walk(self.source, source, dest, self.opts.max_depth, &mut extraction)?;
        Ok(extraction.report)
    }
}

/// Walk visitor that writes the bundle out and keeps the counters.
struct Extraction<'d, 'a> {
    deployer: &'d ResourceDeployer<'a>,
    report: DeployReport,
}

impl Visitor for Extraction<'_, '_> {
    fn enter(&mut self, dir: &Job, entries: usize) -> bool {
        let ResourceDeployer { dest, log, opts, .. } = self.deployer;
        if dir.probe {
            log.debug(&format!(
                "fallback probe: {} is a directory",
                dir.source.display()
            ));
            self.report.recovered += 1;
        }
        if opts.dry_run {
            log.dry_run(&format!("would create {}", dir.dest.display()));
        } else if let Err(e) = dest.ensure_dir(&dir.dest) {
            log.warn(&format!(
                "{e}; skipping {entries} entries of {}",
                dir.source.display()
            ));
            self.report.skipped += u32::try_from(entries).unwrap_or(u32::MAX);
            return false;
        }
        self.report.directories += 1;
        true
    }

    fn leaf(&mut self, leaf: &Job) -> bool {
        let ResourceDeployer {
            source,
            dest,
            log,
            opts,
            ..
        } = self.deployer;
        match copy::copy_leaf(
            *source,
            *dest,
            *log,
            &leaf.source,
            &leaf.dest,
            opts.buffer_size,
            opts.dry_run,
        ) {
            Ok(Copied { bytes }) => {
                if opts.dry_run {
                    log.dry_run(&format!(
                        "would copy {} ({bytes} bytes)",
                        leaf.source.display()
                    ));
                } else {
                    log.debug(&format!("copied {} ({bytes} bytes)", leaf.source.display()));
                }
                self.report.files += 1;
                self.report.bytes += bytes;
                false
            }
            Err(CopyFailure::NeedsFallback(e)) => {
                log.debug(&format!("{e}; probing it as a directory"));
                self.report.fallbacks += 1;
                true
            }
            Err(CopyFailure::Unwritable(e)) => {
                log.warn(&format!("{e}; skipping"));
                self.report.skipped += 1;
                false
            }
        }
    }

    fn skip(&mut self, skip: Skip<'_>) {
        let log = self.deployer.log;
        match skip {
            Skip::UnsafeName { parent, name } => log.warn(&format!(
                "skipping entry with unsafe name {name:?} in {}",
                parent.source.display()
            )),
            Skip::TooDeep(job) => {
                let e = ResourceError::DepthExceeded {
                    path: job.source.clone(),
                    limit: self.deployer.opts.max_depth,
                };
                log.warn(&format!("{e}; skipping"));
            }
            Skip::Unlisted(job, e) if job.probe => log.warn(&format!(
                "fallback probe failed, skipping {}: {e}",
                job.source.display()
            )),
            Skip::Unlisted(_, e) => log.warn(&format!("skipping directory: {e}")),
        }
        self.report.skipped += 1;
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::StateError;
    use crate::logging::{Level, RecordingLog};
    use crate::resources::test_helpers::ReadOnlyFiles;
    use crate::resources::{DataDir, Entry, MemoryTree};
    use crate::state::{MemoryFlagStore, MockFlagStore};

    const KEY: &str = "model_init";

    fn opts() -> DeployOptions {
        DeployOptions {
            flag_key: KEY.to_string(),
            buffer_size: 4,
            max_depth: 8,
            dry_run: false,
            force: false,
        }
    }

    fn root_bundle() -> Vec<Bundle> {
        vec![Bundle::new("", "out")]
    }

    fn read(dir: &tempfile::TempDir, path: &str) -> Vec<u8> {
        std::fs::read(dir.path().join(path)).unwrap()
    }

    #[test]
    fn mirrors_nested_tree_and_sets_flag() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("a", b"x").with_leaf("b/c", b"yz");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        let report = outcome.report().unwrap().clone();
        assert_eq!(outcome, DeployOutcome::Completed(report.clone()));
        assert_eq!(report.files, 2);
        assert_eq!(report.bytes, 3);
        assert_eq!(report.directories, 2);
        assert_eq!(read(&dir, "out/a"), b"x");
        assert_eq!(read(&dir, "out/b/c"), b"yz");
        assert!(flags.get(KEY).unwrap());
    }

    #[test]
    fn second_deploy_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("a", b"x").with_leaf("b/c", b"yz");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();
        let deployer = ResourceDeployer::new(&tree, &data, &flags, &log, opts());

        assert!(matches!(deployer.deploy(&root_bundle()), DeployOutcome::Completed(_)));
        assert_eq!(deployer.deploy(&root_bundle()), DeployOutcome::AlreadyDeployed);
        assert_eq!(tree.open_count(), 2, "each leaf opened exactly once");
        assert_eq!(flags.writes(), 1);
    }

    #[test]
    fn set_flag_skips_all_io() {
        let tree = MemoryTree::new().with_leaf("a", b"x");
        let data = DataDir::new("/nonexistent/never/written");
        let mut flags = MockFlagStore::new();
        flags
            .expect_get()
            .withf(|key| key == KEY)
            .times(1)
            .returning(|_| Ok(true));
        flags.expect_set().times(0);
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        assert_eq!(outcome, DeployOutcome::AlreadyDeployed);
        assert!(tree.listed_paths().is_empty());
    }

    #[test]
    fn unreadable_flag_deploys_again() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("a", b"x");
        let data = DataDir::new(dir.path());
        let mut flags = MockFlagStore::new();
        flags.expect_get().returning(|_| {
            Err(StateError::Read {
                path: PathBuf::from("state/model.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        });
        flags
            .expect_set()
            .withf(|key, value| key == KEY && *value)
            .times(1)
            .returning(|_, _| Ok(()));
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        assert!(matches!(outcome, DeployOutcome::Completed(_)));
        assert!(log.contains(Level::Warn, "deploying again"));
    }

    #[test]
    fn unlistable_root_leaves_flag_unset_and_retries() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("a", b"x").with_unlistable("");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();
        let deployer = ResourceDeployer::new(&tree, &data, &flags, &log, opts());

        let outcome = deployer.deploy(&root_bundle());
        assert!(matches!(outcome, DeployOutcome::Incomplete { ref unlisted, .. } if unlisted == &[PathBuf::new()]));
        assert!(!flags.get(KEY).unwrap());
        assert_eq!(flags.writes(), 0);
        assert!(!dir.path().join("out").exists());

        deployer.deploy(&root_bundle());
        assert_eq!(tree.listed_paths().len(), 2, "second run lists again");
    }

    #[test]
    fn one_missing_bundle_blocks_the_flag_but_others_deploy() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("app_data/voice", b"v");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();
        let bundles = vec![
            Bundle::new("app_data", "app_data"),
            Bundle::new("shared_prefs", "shared_prefs"),
        ];

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&bundles);

        assert!(matches!(
            outcome,
            DeployOutcome::Incomplete { ref report, ref unlisted }
                if report.files == 1 && unlisted == &[PathBuf::from("shared_prefs")]
        ));
        assert_eq!(read(&dir, "app_data/voice"), b"v");
        assert!(!flags.get(KEY).unwrap());
        assert!(log.contains(Level::Error, "shared_prefs"));
    }

    #[test]
    fn unreadable_leaf_is_probed_then_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_unreadable_leaf("a");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        let report = outcome.report().unwrap();
        assert!(matches!(outcome, DeployOutcome::Completed(_)));
        assert_eq!(report.fallbacks, 1);
        assert_eq!(report.recovered, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(tree.listed_paths(), vec![PathBuf::new(), PathBuf::from("a")]);
        assert!(!dir.path().join("out/a").exists());
        assert!(flags.get(KEY).unwrap());
        assert!(log.contains(Level::Warn, "fallback probe failed"));
    }

    #[test]
    fn fallback_probe_recovers_opaque_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new()
            .with_opaque_dir("model")
            .with_leaf("model/part1", b"12")
            .with_leaf("model/part2", b"345");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        let report = outcome.report().unwrap();
        assert_eq!(report.fallbacks, 1);
        assert_eq!(report.recovered, 1);
        assert_eq!(report.files, 2);
        assert_eq!(read(&dir, "out/model/part1"), b"12");
        assert_eq!(read(&dir, "out/model/part2"), b"345");
    }

    #[test]
    fn broken_leaf_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new()
            .with_broken_leaf("a", b"half")
            .with_leaf("b", b"ok");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        assert!(matches!(outcome, DeployOutcome::Completed(_)));
        assert!(!dir.path().join("out/a").exists());
        assert_eq!(read(&dir, "out/b"), b"ok");
    }

    #[test]
    fn unwritable_file_is_skipped_without_probe() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("a", b"x").with_leaf("b", b"y");
        let data = ReadOnlyFiles::new(DataDir::new(dir.path()), &["out/a"]);
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        let report = outcome.report().unwrap();
        assert_eq!(report.files, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.fallbacks, 0);
        assert_eq!(tree.listed_paths(), vec![PathBuf::new()]);
        assert_eq!(read(&dir, "out/b"), b"y");
        assert!(flags.get(KEY).unwrap());
    }

    #[test]
    fn log_file_lines_carry_the_bundle() {
        let (log, _tmp, _guard) = crate::logging::isolated_logger();
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("app_data/voice", b"v");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();

        ResourceDeployer::new(&tree, &data, &flags, &log, opts())
            .deploy(&[Bundle::new("app_data", "app_data")]);

        let contents = std::fs::read_to_string(log.log_path().unwrap()).unwrap();
        assert!(
            contents
                .lines()
                .any(|l| l.contains("[app_data] [debug] copied app_data/voice")),
            "{contents}"
        );
    }

    #[test]
    fn uncreatable_directory_skips_its_entries() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(dir.path().join("out/b"), b"in the way").unwrap();
        let tree = MemoryTree::new()
            .with_leaf("a", b"x")
            .with_leaf("b/c", b"yz")
            .with_leaf("b/d", b"w");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        let report = outcome.report().unwrap().clone();
        assert_eq!(outcome, DeployOutcome::Completed(report.clone()));
        assert_eq!(report.files, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.directories, 1);
        assert_eq!(tree.open_count(), 1, "entries of b never opened");
        assert_eq!(read(&dir, "out/a"), b"x");
        assert_eq!(read(&dir, "out/b"), b"in the way");
        assert!(log.contains(Level::Warn, "cannot create directory"));
        assert!(flags.get(KEY).unwrap());
    }

    #[test]
    fn unlistable_subdirectory_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new()
            .with_leaf("a", b"x")
            .with_leaf("b/c", b"yz")
            .with_unlistable("b");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        assert!(matches!(outcome, DeployOutcome::Completed(_)));
        assert_eq!(outcome.report().unwrap().skipped, 1);
        assert_eq!(read(&dir, "out/a"), b"x");
        assert!(!dir.path().join("out/b/c").exists());
        assert!(flags.get(KEY).unwrap());
    }

    #[test]
    fn empty_root_creates_destination_and_sets_flag() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new();
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        assert!(matches!(outcome, DeployOutcome::Completed(_)));
        assert!(dir.path().join("out").is_dir());
        assert_eq!(std::fs::read_dir(dir.path().join("out")).unwrap().count(), 0);
        assert!(flags.get(KEY).unwrap());
    }

    #[test]
    fn empty_leaf_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("empty", b"").with_dir("nothing");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        assert!(read(&dir, "out/empty").is_empty());
        assert!(dir.path().join("out/nothing").is_dir());
    }

    #[test]
    fn depth_limit_skips_deeper_entries() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new()
            .with_leaf("top", b"t")
            .with_leaf("a/mid", b"m")
            .with_leaf("a/b/deep", b"d");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();
        let limited = DeployOptions {
            max_depth: 1,
            ..opts()
        };

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, limited).deploy(&root_bundle());

        assert_eq!(outcome.report().unwrap().skipped, 1);
        assert_eq!(read(&dir, "out/top"), b"t");
        assert_eq!(read(&dir, "out/a/mid"), b"m");
        assert!(!dir.path().join("out/a/b").exists());
        assert!(log.contains(Level::Warn, "deeper than the limit"));
        assert!(flags.get(KEY).unwrap());
    }

    #[test]
    fn dry_run_reads_everything_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("a", b"x").with_leaf("b/c", b"yz");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();
        let dry = DeployOptions {
            dry_run: true,
            ..opts()
        };

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, dry).deploy(&root_bundle());

        assert!(matches!(outcome, DeployOutcome::DryRun(ref r) if r.files == 2 && r.bytes == 3));
        assert_eq!(tree.open_count(), 2);
        assert!(!dir.path().join("out").exists());
        assert_eq!(flags.writes(), 0);
        assert!(log.contains(Level::DryRun, "would set flag"));
    }

    #[test]
    fn force_redeploys_over_set_flag() {
        let dir = tempfile::tempdir().unwrap();
        let tree = MemoryTree::new().with_leaf("a", b"x");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        flags.set(KEY, true).unwrap();
        let log = RecordingLog::new();
        let forced = DeployOptions {
            force: true,
            ..opts()
        };

        let outcome = ResourceDeployer::new(&tree, &data, &flags, &log, forced).deploy(&root_bundle());

        assert!(matches!(outcome, DeployOutcome::Completed(_)));
        assert_eq!(read(&dir, "out/a"), b"x");
    }

    #[test]
    fn existing_files_are_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("out")).unwrap();
        std::fs::write(dir.path().join("out/a"), b"stale and longer").unwrap();
        std::fs::write(dir.path().join("out/extra"), b"kept").unwrap();
        let tree = MemoryTree::new().with_leaf("a", b"x");
        let data = DataDir::new(dir.path());
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        ResourceDeployer::new(&tree, &data, &flags, &log, opts()).deploy(&root_bundle());

        assert_eq!(read(&dir, "out/a"), b"x");
        assert_eq!(read(&dir, "out/extra"), b"kept");
    }

    #[test]
    fn unsafe_entry_names_are_skipped() {
        #[derive(Debug)]
        struct Hostile;

        impl ResourceTree for Hostile {
            fn list(&self, _path: &Path) -> Result<Vec<Entry>, ResourceError> {
                Ok(vec![Entry::leaf("../escape"), Entry::leaf("..")])
            }

            fn open(&self, _path: &Path) -> Result<Box<dyn std::io::Read + '_>, ResourceError> {
                Ok(Box::new(&b"evil"[..]))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path().join("data"));
        let flags = MemoryFlagStore::new();
        let log = RecordingLog::new();

        let outcome =
            ResourceDeployer::new(&Hostile, &data, &flags, &log, opts()).deploy(&root_bundle());

        assert_eq!(outcome.report().unwrap().skipped, 2);
        assert!(!dir.path().join("data/escape").exists());
        assert!(!dir.path().join("escape").exists());
    }
}
