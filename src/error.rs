//! Domain-specific error types for configuration and persisted state.
//!
//! Resource-level failures live in [`crate::resources::ResourceError`].
//! Internal modules return these typed errors while command handlers at the
//! CLI boundary convert them to [`anyhow::Error`] via the standard `?`
//! operator.
//!
//! ```text
//! ConfigError   : deploy.toml reading, parsing, invalid values
//! StateError    : deployment flag store reading and writing
//! ResourceError : bundle listing/opening, data-directory writes
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from loading `deploy.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The config file is not valid TOML or does not match the schema.
    #[error("Invalid TOML in {}: {source}", .path.display())]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },

    /// A value parsed but is unusable (e.g. a zero buffer size).
    #[error("Invalid value for '{key}': {message}")]
    Invalid {
        /// Dotted key of the offending value.
        key: String,
        /// Human-readable reason.
        message: String,
    },
}

/// Errors that arise from the persisted deployment flag store.
#[derive(Error, Debug)]
pub enum StateError {
    /// The state file exists but could not be read.
    #[error("cannot read state file {}: {source}", .path.display())]
    Read {
        /// Path of the state file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The state file is not a JSON object of booleans.
    #[error("state file {} is corrupted: {source}", .path.display())]
    Corrupted {
        /// Path of the state file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The state file could not be written.
    #[error("cannot write state file {}: {source}", .path.display())]
    Write {
        /// Path of the state file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}
