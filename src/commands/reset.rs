//! Reset command implementation.
use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::logging::Log;
use crate::state::FlagStore;

/// Run the reset command: clear the deployment flag.  Deployed files are
/// left in place and overwritten by the next deploy.
///
/// # Errors
///
/// Returns an error if setup fails or the flag cannot be written.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let key = &setup.config.state.key;

    log.stage("Resetting deployment flag");
    if global.dry_run {
        log.dry_run(&format!("would clear flag '{key}'"));
        return Ok(());
    }
    setup
        .flags
        .set(key, false)
        .with_context(|| format!("clearing flag '{key}'"))?;
    log.info(&format!("flag '{key}' cleared; the next deploy will run again"));
    Ok(())
}
