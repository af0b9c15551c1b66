//! Console and log-file output, plus the end-of-run summary.
//!
//! Code that reports progress takes a [`Log`]; the binary hands it a
//! [`Logger`], whose events reach the console and the per-command log file
//! through the subscriber from [`init_subscriber`].

mod file;
mod logger;
mod subscriber;
mod types;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, Tally, TaskRecord, TaskStatus};

/// A [`Logger`] writing through a thread-local subscriber into a temporary
/// log file. Keep the guard alive while logging.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (
    Logger,
    tempfile::NamedTempFile,
    tracing::dispatcher::DefaultGuard,
) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::NamedTempFile::new().expect("temp log file");
    let layer = file::FileLayer::open(tmp.path(), "test").expect("file layer");
    let log = Logger::with_log_file(Some(tmp.path().to_path_buf()));
    let subscriber = tracing_subscriber::registry().with(layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}
