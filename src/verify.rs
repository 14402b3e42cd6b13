//! Read-only comparison of a bundle with its deployed copy.
//!
//! Every leaf reachable in the bundle is hashed with SHA-256 and compared
//! with the file at the same relative path in the data directory.  The walk
//! follows the same rules as a deployment (fallback probes, unsafe names,
//! depth limit), so a leaf that a deployment would skip is reported as
//! unreadable rather than missing.
use std::fmt::Write as _;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::deploy::Bundle;
use crate::deploy::walk::{Job, Skip, Visitor, walk};
use crate::logging::bundle_span;
use crate::resources::{DataDir, ResourceError, ResourceTree};

/// Outcome of comparing one or more bundles with the data directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Leaves whose deployed copy has the same digest.
    pub matched: u32,
    /// Deployed files whose content differs, as data-directory paths.
    pub mismatched: Vec<PathBuf>,
    /// Leaves with no deployed file, as data-directory paths.
    pub missing: Vec<PathBuf>,
    /// Bundle paths that could not be listed or read.
    pub unreadable: Vec<PathBuf>,
}

impl VerifyReport {
    /// Returns `true` if every leaf matched.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.mismatched.is_empty() && self.missing.is_empty() && self.unreadable.is_empty()
    }

    /// Format a one-line summary of the report.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!("{} matched", self.matched);
        for (count, label) in [
            (self.mismatched.len(), "mismatched"),
            (self.missing.len(), "missing"),
            (self.unreadable.len(), "unreadable"),
        ] {
            if count > 0 {
                let _ = write!(out, ", {count} {label}");
            }
        }
        out
    }
}

/// Compute the hex-encoded SHA-256 digest of everything `reader` yields.
///
/// # Errors
///
/// Returns the first non-interrupt read error.
pub fn digest(reader: &mut dyn Read, buffer_size: usize) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; buffer_size.max(1)];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(buf.get(..n).unwrap_or_default()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        }))
}

/// Compares bundles with the data directory they were deployed into.
#[derive(Debug)]
pub struct Verifier<'a> {
    source: &'a dyn ResourceTree,
    data: &'a DataDir,
    buffer_size: usize,
    max_depth: usize,
}

impl<'a> Verifier<'a> {
    /// Create a verifier.
    #[must_use]
    pub const fn new(
        source: &'a dyn ResourceTree,
        data: &'a DataDir,
        buffer_size: usize,
        max_depth: usize,
    ) -> Self {
        Self {
            source,
            data,
            buffer_size,
            max_depth,
        }
    }

    /// Compare every bundle in `bundles`.
    #[must_use]
    pub fn verify(&self, bundles: &[Bundle]) -> VerifyReport {
        let mut report = VerifyReport::default();
        for bundle in bundles {
            let _bundle = bundle_span(&bundle.source).entered();
            self.verify_bundle(bundle, &mut report);
        }
        report
    }

    fn verify_bundle(&self, bundle: &Bundle, report: &mut VerifyReport) {
        let mut visitor = Comparing {
            verifier: self,
            report: &mut *report,
        };
        if walk(
            self.source,
            &bundle.source,
            &bundle.destination,
            self.max_depth,
            &mut visitor,
        )
        .is_err()
        {
            report.unreadable.push(bundle.source.clone());
        }
    }

    fn compare(&self, src: &Path, dst: &Path) -> Result<Comparison, ResourceError> {
        let mut reader = self.source.open(src)?;
        let expected =
            digest(&mut reader, self.buffer_size).map_err(|e| ResourceError::read(src, e))?;

        let deployed = self.data.resolve(dst);
        let mut file = match std::fs::File::open(&deployed) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Comparison::Missing),
            Err(_) => return Ok(Comparison::Differs),
        };
        match digest(&mut file, self.buffer_size) {
            Ok(actual) if actual == expected => Ok(Comparison::Match),
            _ => Ok(Comparison::Differs),
        }
    }
}

enum Comparison {
    Match,
    Differs,
    Missing,
}

/// Walk visitor that files every reached leaf into a [`VerifyReport`].
struct Comparing<'v, 'a> {
    verifier: &'v Verifier<'a>,
    report: &'v mut VerifyReport,
}

impl Visitor for Comparing<'_, '_> {
    fn enter(&mut self, _dir: &Job, _entries: usize) -> bool {
        true
    }

    fn leaf(&mut self, leaf: &Job) -> bool {
        match self.verifier.compare(&leaf.source, &leaf.dest) {
            Ok(Comparison::Match) => self.report.matched += 1,
            Ok(Comparison::Differs) => self.report.mismatched.push(leaf.dest.clone()),
            Ok(Comparison::Missing) => self.report.missing.push(leaf.dest.clone()),
            // Same as a deployment: the listing decides.
            Err(_) => return true,
        }
        false
    }

    fn skip(&mut self, skip: Skip<'_>) {
        let path = match skip {
            Skip::UnsafeName { parent, name } => parent.source.join(name),
            Skip::TooDeep(job) | Skip::Unlisted(job, _) => job.source.clone(),
        };
        self.report.unreadable.push(path);
    }
}
