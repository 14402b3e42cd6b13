//! Command handlers and the setup they share.
//!
//! Every handler resolves the bundle root and data directory, loads the
//! configuration through [`CommandSetup::init`], then does its own work.
pub mod deploy;
pub mod reset;
pub mod status;
pub mod verify;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{self, Config};
use crate::logging::Log;
use crate::resources::DataDir;
use crate::state::JsonFlagStore;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "BUNDLE_DEPLOY_DATA_DIR";
/// Environment variable overriding the bundle root.
pub const BUNDLE_ENV: &str = "BUNDLE_DEPLOY_BUNDLE";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates location resolution and configuration loading so that each
/// command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Directory the bundles are read from.
    pub bundle_root: PathBuf,
    /// Directory the bundles are deployed into.
    pub data_dir: DataDir,
    /// Config file that was consulted (it may not exist).
    pub config_path: PathBuf,
    /// Loaded configuration.
    pub config: Config,
    /// Persisted deployment flag.
    pub flags: JsonFlagStore,
}

impl CommandSetup {
    /// Resolve locations and load the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be determined or the
    /// configuration fails to load.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let bundle_root = resolve_bundle_root(global)?;
        let data_dir = DataDir::new(resolve_data_dir(global)?);
        log.debug(&format!("bundle root: {}", bundle_root.display()));
        log.debug(&format!("data directory: {}", data_dir.root().display()));

        log.stage("Loading configuration");
        let config_path = global
            .config
            .clone()
            .unwrap_or_else(|| bundle_root.join(config::CONFIG_FILE_NAME));
        let config = Config::load(&config_path)
            .with_context(|| format!("loading {}", config_path.display()))?;
        if config_path.exists() {
            log.info(&format!(
                "loaded {} bundle(s) from {}",
                config.bundles.len(),
                config_path.display()
            ));
        } else {
            log.info(&format!(
                "no {} found, using {} default bundle(s)",
                config::CONFIG_FILE_NAME,
                config.bundles.len()
            ));
        }

        let warnings = config::validation::validate_all(&config, &bundle_root);
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        let flags = JsonFlagStore::new(data_dir.resolve(&config.state.file));
        Ok(Self {
            bundle_root,
            data_dir,
            config_path,
            config,
            flags,
        })
    }
}

/// Resolve the data directory from CLI arguments or the environment.
///
/// Order: `--data-dir`, `BUNDLE_DEPLOY_DATA_DIR`,
/// `$XDG_DATA_HOME/bundle-deploy`, `~/.local/share/bundle-deploy`.
///
/// # Errors
///
/// Returns an error if none of the above is available.
pub fn resolve_data_dir(global: &GlobalOpts) -> Result<PathBuf> {
    data_dir_from(global.data_dir.as_deref(), |key| std::env::var(key).ok())
}

fn data_dir_from(explicit: Option<&Path>, var: impl Fn(&str) -> Option<String>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = var(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = var("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join("bundle-deploy"));
    }
    if let Some(home) = var("HOME").or_else(|| var("USERPROFILE")) {
        return Ok(PathBuf::from(home).join(".local/share/bundle-deploy"));
    }
    anyhow::bail!("cannot determine data directory. Use --data-dir or set {DATA_DIR_ENV}");
}

/// Resolve the bundle root from CLI arguments, the environment, or the
/// binary's install location.
///
/// Order: `--bundle`, `BUNDLE_DEPLOY_BUNDLE`,
/// `<exe>/../share/bundle-deploy/assets` if it exists, `./assets`.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read.
pub fn resolve_bundle_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.bundle {
        return Ok(root.clone());
    }

    if let Ok(root) = std::env::var(BUNDLE_ENV)
        && !root.is_empty()
    {
        return Ok(PathBuf::from(root));
    }

    // Installed layout: bin/bundle-deploy next to share/bundle-deploy/assets
    if let Ok(exe) = std::env::current_exe()
        && let Some(parent) = exe.parent()
    {
        let candidate = parent.join("../share/bundle-deploy/assets");
        if candidate.is_dir() {
            return Ok(std::fs::canonicalize(candidate)?);
        }
    }

    Ok(std::env::current_dir()?.join("assets"))
}
