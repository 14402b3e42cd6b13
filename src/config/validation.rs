//! Non-fatal configuration checks.
//!
//! Problems found here are reported as [`ValidationWarning`]s and never stop
//! a command; hard errors are raised by [`Config::check`](super::Config::check).
use std::collections::HashSet;
use std::path::Path;

use super::Config;

/// A validation warning detected during configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// The configuration source (e.g., "deploy.toml").
    pub source: String,
    /// The specific item or section that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

/// Trait for configuration validators.
///
/// Validators report problems that do not stop a deployment but are almost
/// certainly mistakes.
pub trait ConfigValidator {
    /// Validate the configuration against the bundle at `bundle_root`.
    fn validate(&self, bundle_root: &Path) -> Vec<ValidationWarning>;
}

/// Validator for the `[[bundle]]` list.
#[derive(Debug)]
pub struct BundleValidator<'a> {
    config: &'a Config,
}

impl<'a> BundleValidator<'a> {
    /// Create a validator for `config`.
    #[must_use]
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }
}

impl ConfigValidator for BundleValidator<'_> {
    fn validate(&self, bundle_root: &Path) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if self.config.bundles.is_empty() {
            warnings.push(ValidationWarning::new(
                super::CONFIG_FILE_NAME,
                "bundle",
                "no bundles configured; deploy will only set the flag",
            ));
        }

        let mut destinations = HashSet::new();
        for bundle in &self.config.bundles {
            let item = bundle.source.display().to_string();

            if !bundle_root.join(&bundle.source).is_dir() {
                warnings.push(ValidationWarning::new(
                    super::CONFIG_FILE_NAME,
                    &item,
                    format!(
                        "source directory not found under {}; deploy will not complete",
                        bundle_root.display()
                    ),
                ));
            }

            if !destinations.insert(bundle.destination.as_path()) {
                warnings.push(ValidationWarning::new(
                    super::CONFIG_FILE_NAME,
                    &item,
                    format!(
                        "destination {} is shared with an earlier bundle",
                        bundle.destination.display()
                    ),
                ));
            }

            if self.config.state.file.starts_with(&bundle.destination) {
                warnings.push(ValidationWarning::new(
                    super::CONFIG_FILE_NAME,
                    &item,
                    format!(
                        "state file {} lies inside this bundle's destination and may be overwritten",
                        self.config.state.file.display()
                    ),
                ));
            }
        }

        warnings
    }
}

/// Run every validator over `config`.
#[must_use]
pub fn validate_all(config: &Config, bundle_root: &Path) -> Vec<ValidationWarning> {
    BundleValidator::new(config).validate(bundle_root)
}
