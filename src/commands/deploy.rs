//! Deploy command implementation.
use anyhow::Result;

use crate::cli::{DeployOpts, GlobalOpts};
use crate::deploy::{DeployOptions, DeployOutcome, ResourceDeployer};
use crate::logging::Log;
use crate::resources::DirBundle;

/// Run the deploy command.
///
/// A deployment that could not list every bundle root is reported but is
/// not an error: the flag stays unset and the next run retries.
///
/// # Errors
///
/// Returns an error if location resolution or configuration loading fails.
pub fn run(global: &GlobalOpts, opts: &DeployOpts, log: &dyn Log) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let bundle = DirBundle::new(&setup.bundle_root);
    let options = DeployOptions {
        dry_run: global.dry_run,
        force: opts.force,
        ..DeployOptions::from_config(&setup.config)
    };
    let key = options.flag_key.clone();

    log.stage("Deploying bundles");
    let deployer = ResourceDeployer::new(&bundle, &setup.data_dir, &setup.flags, log, options);
    match deployer.deploy(&setup.config.bundles) {
        DeployOutcome::AlreadyDeployed => log.info(&format!(
            "already deployed (flag '{key}' is set); use --force to deploy again"
        )),
        DeployOutcome::Completed(report) => log.info(&report.summary(false)),
        DeployOutcome::DryRun(report) => log.dry_run(&report.summary(true)),
        DeployOutcome::Incomplete { report, unlisted } => {
            log.info(&report.summary(global.dry_run));
            log.warn(&format!(
                "{} bundle(s) could not be read; flag '{key}' not set, the next run will retry",
                unlisted.len()
            ));
        }
    }
    Ok(())
}
