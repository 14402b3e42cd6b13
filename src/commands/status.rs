//! Status command implementation.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Log;
use crate::state::FlagStore;

/// Run the status command.
///
/// # Errors
///
/// Returns an error if location resolution or configuration loading fails.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let key = &setup.config.state.key;

    log.stage("Deployment status");
    match setup.flags.get(key) {
        Ok(true) => log.info(&format!("flag '{key}': deployed")),
        Ok(false) => log.info(&format!("flag '{key}': not deployed")),
        Err(e) => log.warn(&format!("flag '{key}': {e}")),
    }
    log.info(&format!("flag store: {}", setup.flags.path().display()));
    log.info(&format!("data directory: {}", setup.data_dir.root().display()));
    log.info(&format!("bundle root: {}", setup.bundle_root.display()));
    for bundle in &setup.config.bundles {
        log.info(&format!(
            "  {} -> {}",
            bundle.source.display(),
            bundle.destination.display()
        ));
    }
    Ok(())
}
