//! Global `tracing` subscriber: console output plus the log file.
use std::fmt;
use std::io::IsTerminal as _;

use tracing::Level;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, format::Writer};
use tracing_subscriber::registry::LookupSpan;

use super::file::FileLayer;

/// `tracing` target used for stage headers.
pub(super) const STAGE_TARGET: &str = "dotlink::stage";
/// `tracing` target used for dry-run intent lines.
pub(super) const DRY_RUN_TARGET: &str = "dotlink::dry_run";

/// How an event is rendered, derived from its level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Kind {
    Stage,
    DryRun,
    Error,
    Warn,
    Info,
    Debug,
}

impl Kind {
    pub(super) fn of(meta: &tracing::Metadata<'_>) -> Self {
        match (*meta.level(), meta.target()) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, DRY_RUN_TARGET) => Self::DryRun,
            (Level::INFO, _) => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Plain-text marker written before the message in the log file.
    pub(super) const fn file_tag(self) -> &'static str {
        match self {
            Self::Stage => "==>",
            Self::DryRun => "[dry run]",
            Self::Error => "[error]",
            Self::Warn => "[warn]",
            Self::Info => "",
            Self::Debug => "[debug]",
        }
    }

    /// Console prefix and the SGR code it is painted with.
    const fn console_prefix(self) -> (&'static str, &'static str) {
        match self {
            Self::Stage => ("==> ", "1;34"),
            Self::DryRun => ("  [DRY RUN] ", "33"),
            Self::Error => ("error: ", "1;31"),
            Self::Warn => ("warning: ", "1;33"),
            Self::Info => ("  ", ""),
            Self::Debug => ("  ", "2"),
        }
    }
}

/// The `message` field of an event, formatted.
pub(super) fn message_of(event: &tracing::Event<'_>) -> String {
    struct Message(String);

    impl tracing::field::Visit for Message {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                value.clone_into(&mut self.0);
            }
        }

        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    let mut message = Message(String::new());
    event.record(&mut message);
    message.0
}

/// One line per event; colour only when the writer supports it.
struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let (prefix, sgr) = Kind::of(event.metadata()).console_prefix();
        let msg = message_of(event);
        if sgr.is_empty() || !writer.has_ansi_escapes() {
            writeln!(writer, "{prefix}{msg}")
        } else {
            writeln!(writer, "\x1b[{sgr}m{prefix}\x1b[0m{msg}")
        }
    }
}

/// Install the global subscriber for `command`.
///
/// Warnings and errors go to stderr, everything else to stdout, at `INFO`
/// (or `DEBUG` with `verbose`). The log file receives every event down to
/// `DEBUG`. Call once, before anything logs.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{Layer as _, layer::SubscriberExt as _, util::SubscriberInitExt as _};

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    let console = tracing_subscriber::fmt::layer()
        .event_format(ConsoleFormat)
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(writer)
        .with_filter(console_level);
    let file = FileLayer::new(command).map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry().with(console).with(file).init();
}
