//! Verify command implementation.
use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::logging::Log;
use crate::resources::DirBundle;
use crate::verify::Verifier;

/// Run the verify command.
///
/// # Errors
///
/// Returns an error if setup fails or any deployed file is missing, differs
/// from the bundle, or could not be compared.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let setup = super::CommandSetup::init(global, log)?;
    let bundle = DirBundle::new(&setup.bundle_root);

    log.stage("Verifying deployed files");
    let verifier = Verifier::new(
        &bundle,
        &setup.data_dir,
        setup.config.copy.buffer_size,
        setup.config.copy.max_depth,
    );
    let report = verifier.verify(&setup.config.bundles);

    for path in &report.mismatched {
        log.warn(&format!("changed: {}", path.display()));
    }
    for path in &report.missing {
        log.warn(&format!("missing: {}", path.display()));
    }
    for path in &report.unreadable {
        log.warn(&format!("unreadable in bundle: {}", path.display()));
    }

    if !report.is_clean() {
        anyhow::bail!("deployed files differ from the bundle: {}", report.summary());
    }
    log.info(&report.summary());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::DeployOpts;
    use crate::logging::{Level, RecordingLog};

    fn fixture() -> (tempfile::TempDir, tempfile::TempDir, GlobalOpts) {
        let bundle = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();
        std::fs::write(
            bundle.path().join("deploy.toml"),
            "[[bundle]]\nsource = \"app_data\"\ndestination = \"app_data\"\n",
        )
        .unwrap();
        std::fs::create_dir_all(bundle.path().join("app_data")).unwrap();
        std::fs::write(bundle.path().join("app_data/a.bin"), b"abc").unwrap();
        let global = GlobalOpts {
            bundle: Some(bundle.path().to_path_buf()),
            data_dir: Some(data.path().to_path_buf()),
            ..GlobalOpts::default()
        };
        (bundle, data, global)
    }

    #[test]
    fn clean_after_deploy() {
        let (_bundle, _data, global) = fixture();
        super::super::deploy::run(&global, &DeployOpts::default(), &RecordingLog::new()).unwrap();
        let log = RecordingLog::new();
        run(&global, &log).unwrap();
        assert!(log.contains(Level::Info, "1 matched"));
    }

    #[test]
    fn fails_before_deploy() {
        let (_bundle, _data, global) = fixture();
        let log = RecordingLog::new();
        let err = run(&global, &log).unwrap_err();
        assert!(err.to_string().contains("1 missing"));
        assert!(log.contains(Level::Warn, "missing: app_data/a.bin"));
    }

    #[test]
    fn detects_edited_file() {
        let (_bundle, data, global) = fixture();
        super::super::deploy::run(&global, &DeployOpts::default(), &RecordingLog::new()).unwrap();
        std::fs::write(data.path().join("app_data/a.bin"), b"tampered").unwrap();
        let log = RecordingLog::new();
        assert!(run(&global, &log).is_err());
        assert!(log.contains(Level::Warn, "changed: app_data/a.bin"));
    }
}
