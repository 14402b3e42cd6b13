//! Deployment configuration (`deploy.toml`).
//!
//! Every key is optional; a missing file yields the defaults below.
//!
//! ```toml
//! [state]
//! file = "state/model.json"   # flag store, relative to the data directory
//! key = "model_init"
//!
//! [copy]
//! buffer_size = 1024          # bytes per read/write
//! max_depth = 32              # levels below a bundle root
//!
//! [[bundle]]
//! source = "app_data"         # relative to the bundle root
//! destination = "app_data"    # relative to the data directory
//!
//! [[bundle]]
//! source = "shared_prefs"
//! destination = "shared_prefs"
//! ```
pub mod toml_loader;
pub mod validation;

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::deploy::Bundle;
use crate::error::ConfigError;

/// Name of the config file looked up in the bundle root.
pub const CONFIG_FILE_NAME: &str = "deploy.toml";

/// All loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Bundles deployed in order under one flag.
    #[serde(rename = "bundle")]
    pub bundles: Vec<Bundle>,
    /// Where and under which key the deployment flag is persisted.
    pub state: StateConfig,
    /// Copy tuning.
    pub copy: CopyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bundles: vec![
                Bundle::new("app_data", "app_data"),
                Bundle::new("shared_prefs", "shared_prefs"),
            ],
            state: StateConfig::default(),
            copy: CopyConfig::default(),
        }
    }
}

/// `[state]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateConfig {
    /// Flag store path, relative to the data directory.
    pub file: PathBuf,
    /// Key of the deployment flag inside the store.
    pub key: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("state/model.json"),
            key: "model_init".to_string(),
        }
    }
}

/// `[copy]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyConfig {
    /// Size of the fixed copy buffer in bytes.
    pub buffer_size: usize,
    /// Maximum number of levels descended below a bundle root, counting
    /// both directories and fallback probes.
    pub max_depth: usize,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1024,
            max_depth: 32,
        }
    }
}

impl Config {
    /// Load `deploy.toml` from `path`, falling back to defaults if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds a
    /// value the deployer cannot work with (see [`Config::check`]).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml_loader::load_config(path)?;
        config.check()?;
        Ok(config)
    }

    /// Reject values that would make a deployment unsafe or impossible.
    ///
    /// Softer problems are reported by [`validation::validate_all`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero buffer size or depth, an
    /// empty flag key, or any configured path that is absolute or climbs
    /// out of its root with `..`.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.copy.buffer_size == 0 {
            return Err(invalid("copy.buffer_size", "must be greater than zero"));
        }
        if self.copy.max_depth == 0 {
            return Err(invalid("copy.max_depth", "must be greater than zero"));
        }
        if self.state.key.trim().is_empty() {
            return Err(invalid("state.key", "must not be empty"));
        }
        check_relative("state.file", &self.state.file)?;
        if self.state.file.file_name().is_none() {
            return Err(invalid("state.file", "must name a file"));
        }
        for bundle in &self.bundles {
            check_relative("bundle.source", &bundle.source)?;
            check_relative("bundle.destination", &bundle.destination)?;
        }
        Ok(())
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Require `path` to stay inside whatever root it is joined to.
fn check_relative(key: &str, path: &Path) -> Result<(), ConfigError> {
    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::RootDir | Component::Prefix(_) | Component::ParentDir
        )
    });
    if escapes {
        return Err(invalid(
            key,
            format!("'{}' must be a relative path without '..'", path.display()),
        ));
    }
    Ok(())
}
