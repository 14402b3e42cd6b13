//! Persistent per-command log file.
//!
//! Every event at `DEBUG` and above is appended as one plain-text line.
//! Events emitted inside a [`bundle_span`] carry the bundle source, so the
//! lines of a multi-bundle run can be told apart.
use std::fs::{self, File};
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::span::{Attributes, Id};
use tracing::{Event, Span, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

use super::subscriber::{FieldText, Kind};

/// Name of the span field holding the bundle source.
const BUNDLE_FIELD: &str = "bundle";

/// Span covering the extraction or verification of one bundle.
#[must_use]
pub fn bundle_span(source: &Path) -> Span {
    tracing::info_span!("bundle", bundle = %source.display())
}

/// Bundle source stored in the extensions of a [`bundle_span`].
struct BundleTag(String);

/// Directory log files are kept in.
///
/// `$XDG_CACHE_HOME/bundle-deploy`, else `$HOME/.cache/bundle-deploy`, else
/// `./.cache/bundle-deploy`.
pub(super) fn cache_root(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    var("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(
            || {
                var("HOME")
                    .or_else(|| var("USERPROFILE"))
                    .map_or_else(|| PathBuf::from("."), PathBuf::from)
                    .join(".cache")
            },
            PathBuf::from,
        )
        .join("bundle-deploy")
}

/// Log file for `command` under [`cache_root`] of the process environment.
///
/// Returns `None` if the directory cannot be created.
pub(super) fn log_path(command: &str) -> Option<PathBuf> {
    let dir = cache_root(|key| std::env::var(key).ok());
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// A [`Layer`] writing every event it sees to a log file.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<File>,
}

impl FileLayer {
    /// Truncate `path`, write a header naming `command`, and append events
    /// after it.
    pub(super) fn create(path: &Path, command: &str) -> io::Result<Self> {
        let version = option_env!("BUNDLE_DEPLOY_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let started = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        let mut file = File::create(path)?;
        writeln!(file, "# bundle-deploy {version}: {command} started {started}")?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

fn render(kind: Kind, bundle: Option<&str>, message: &str) -> String {
    let mut line = format!("[{}]", chrono::Utc::now().format("%H:%M:%S"));
    if let Some(bundle) = bundle {
        line.push_str(" [");
        line.push_str(bundle);
        line.push(']');
    }
    let tag = match kind {
        Kind::Stage => "==>",
        Kind::DryRun => "[dry run]",
        Kind::Error => "[error]",
        Kind::Warn => "[warn]",
        Kind::Detail => "[debug]",
        Kind::Info => "",
    };
    if !tag.is_empty() {
        line.push(' ');
        line.push_str(tag);
    }
    line.push(' ');
    line.push_str(message);
    line
}

impl<S> Layer<S> for FileLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut field = FieldText::new(BUNDLE_FIELD);
        attrs.record(&mut field);
        if let Some(span) = ctx.span(id)
            && let Some(tag) = field.value.filter(|t| !t.is_empty())
        {
            span.extensions_mut().insert(BundleTag(tag));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut message = FieldText::message();
        event.record(&mut message);
        let bundle = ctx.event_scope(event).and_then(|mut scope| {
            scope.find_map(|span| span.extensions().get::<BundleTag>().map(|t| t.0.clone()))
        });
        let line = render(
            Kind::of(event.metadata()),
            bundle.as_deref(),
            message.value.as_deref().unwrap_or_default(),
        );

        if let Ok(mut file) = self.file.lock() {
            writeln!(file, "{line}").ok();
        }
    }
}
