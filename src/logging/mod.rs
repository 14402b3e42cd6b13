//! Logging infrastructure for structured console and file output.

mod file;
mod logger;
mod subscriber;
mod types;

pub use file::bundle_span;
pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::Log;

/// Severity of a message captured by [`RecordingLog`].
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Stage,
    Info,
    Debug,
    Warn,
    Error,
    DryRun,
}

/// A [`Log`] that keeps every message in memory for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingLog {
    messages: std::sync::Mutex<Vec<(Level, String)>>,
}

#[cfg(test)]
impl RecordingLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, msg: &str) {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((level, msg.to_string()));
    }

    /// All messages recorded at `level`, in order.
    pub(crate) fn at(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Returns `true` if any message at `level` contains `needle`.
    pub(crate) fn contains(&self, level: Level, needle: &str) -> bool {
        self.at(level).iter().any(|m| m.contains(needle))
    }
}

#[cfg(test)]
impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push(Level::Stage, msg);
    }
    fn info(&self, msg: &str) {
        self.push(Level::Info, msg);
    }
    fn debug(&self, msg: &str) {
        self.push(Level::Debug, msg);
    }
    fn warn(&self, msg: &str) {
        self.push(Level::Warn, msg);
    }
    fn error(&self, msg: &str) {
        self.push(Level::Error, msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push(Level::DryRun, msg);
    }
}

/// A [`Logger`] whose events reach a fresh log file in a temporary
/// directory through a thread-local subscriber.
///
/// Keep the returned guard alive for as long as events should be captured.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let file_layer = file::FileLayer::create(&path, "test").expect("failed to create log file");
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (Logger::at(Some(path)), tmp, guard)
}
