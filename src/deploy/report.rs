//! Counters reported by a deployment.
/// Counters collected while extracting one or more bundles.
///
/// # Examples
///
/// ```
/// use bundle_deploy::deploy::DeployReport;
///
/// let report = DeployReport { files: 3, bytes: 42, directories: 2, ..DeployReport::default() };
/// assert_eq!(report.summary(false), "3 files copied (42 bytes), 2 directories");
/// assert_eq!(report.summary(true), "3 files would be copied (42 bytes), 2 directories");
/// ```
///
/// Fallback probes and skipped entries are appended when present:
///
/// ```
/// use bundle_deploy::deploy::DeployReport;
///
/// let report = DeployReport { files: 1, bytes: 1, directories: 1, fallbacks: 2, recovered: 1, skipped: 1 };
/// assert_eq!(
///     report.summary(false),
///     "1 files copied (1 bytes), 1 directories, 2 fallback probes (1 recovered), 1 skipped"
/// );
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeployReport {
    /// Leaves copied in full.
    pub files: u32,
    /// Total bytes copied.
    pub bytes: u64,
    /// Destination directories ensured (bundle roots included).
    pub directories: u32,
    /// Leaves that failed to open or read and were probed as directories.
    pub fallbacks: u32,
    /// Fallback probes whose listing succeeded.
    pub recovered: u32,
    /// Entries lost: failed probes, unlistable subdirectories, unwritable
    /// files, unsafe names, and anything beyond the depth limit.
    pub skipped: u32,
}

impl DeployReport {
    /// Add `other`'s counters to this report.
    pub const fn merge(&mut self, other: &Self) {
        self.files += other.files;
        self.bytes += other.bytes;
        self.directories += other.directories;
        self.fallbacks += other.fallbacks;
        self.recovered += other.recovered;
        self.skipped += other.skipped;
    }

    /// Format a one-line summary of the report.
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would be copied" } else { "copied" };
        let mut out = format!(
            "{} files {verb} ({} bytes), {} directories",
            self.files, self.bytes, self.directories
        );
        if self.fallbacks > 0 {
            out.push_str(&format!(
                ", {} fallback probes ({} recovered)",
                self.fallbacks, self.recovered
            ));
        }
        if self.skipped > 0 {
            out.push_str(&format!(", {} skipped", self.skipped));
        }
        out
    }
}
