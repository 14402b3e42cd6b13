// Shared helpers for integration tests.
//
// Provides a temporary bundle directory and data directory plus a fluent
// builder so each integration test can set up an isolated deployment without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bundle_deploy::cli::GlobalOpts;
use bundle_deploy::logging::Log;
use bundle_deploy::state::{FlagStore, JsonFlagStore};

/// An isolated bundle and data directory, each backed by a
/// [`tempfile::TempDir`] that is deleted on drop.
pub struct IntegrationTestContext {
    /// Read-only side: the packaged bundle.
    pub bundle: tempfile::TempDir,
    /// Writable side: the application data directory.
    pub data: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a context with an empty bundle and an empty data directory.
    pub fn new() -> Self {
        Self {
            bundle: tempfile::tempdir().expect("create bundle dir"),
            data: tempfile::tempdir().expect("create data dir"),
        }
    }

    /// Add a file to the bundle, creating parent directories.
    pub fn with_file(self, path: &str, content: &[u8]) -> Self {
        let full = self.bundle.path().join(path);
        std::fs::create_dir_all(full.parent().expect("file has a parent")).expect("create dirs");
        std::fs::write(full, content).expect("write bundle file");
        self
    }

    /// Add an empty directory to the bundle.
    pub fn with_dir(self, path: &str) -> Self {
        std::fs::create_dir_all(self.bundle.path().join(path)).expect("create bundle dir");
        self
    }

    /// Write `deploy.toml` at the bundle root.
    pub fn with_config(self, toml: &str) -> Self {
        std::fs::write(self.bundle.path().join("deploy.toml"), toml).expect("write deploy.toml");
        self
    }

    /// Global options pointing at this context's directories.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            bundle: Some(self.bundle.path().to_path_buf()),
            data_dir: Some(self.data.path().to_path_buf()),
            ..GlobalOpts::default()
        }
    }

    /// Path of `path` inside the data directory.
    pub fn deployed(&self, path: &str) -> PathBuf {
        self.data.path().join(path)
    }

    /// Read a deployed file.
    pub fn read_deployed(&self, path: &str) -> Vec<u8> {
        std::fs::read(self.deployed(path)).expect("read deployed file")
    }

    /// Current value of the default deployment flag.
    pub fn flag(&self) -> bool {
        JsonFlagStore::new(self.data.path().join("state/model.json"))
            .get("model_init")
            .expect("read flag")
    }

    /// Bundle root.
    pub fn bundle_path(&self) -> &Path {
        self.bundle.path()
    }
}

/// A [`Log`] that records messages instead of printing them.
#[derive(Debug, Default)]
pub struct CapturingLog {
    messages: Mutex<Vec<String>>,
}

impl CapturingLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: &str, msg: &str) {
        self.messages
            .lock()
            .expect("log mutex")
            .push(format!("{level}: {msg}"));
    }

    /// Returns `true` if any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .expect("log mutex")
            .iter()
            .any(|m| m.contains(needle))
    }
}

impl Log for CapturingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry-run", msg);
    }
}
