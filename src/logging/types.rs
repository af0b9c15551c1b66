//! What gets logged: task records, entry tallies and the [`Log`] sink.
use std::ops::AddAssign;

/// Final state of one install task as shown in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Ran and left everything in the desired state.
    Ok,
    /// Turned off for this run (e.g. `[shell] hook = false`).
    NotApplicable,
    /// Ran but found nothing to do.
    Skipped,
    /// Only reported what it would do.
    DryRun,
    /// The task, or at least one of its entries, failed.
    Failed,
}

impl TaskStatus {
    /// Short word used in the summary table.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "n/a",
            Self::Skipped => "skipped",
            Self::DryRun => "dry run",
            Self::Failed => "FAILED",
        }
    }
}

/// A task's name, status and optional detail (skip reason, error chain).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    /// Task name as shown in stage headers.
    pub name: String,
    /// How the task ended.
    pub status: TaskStatus,
    /// Skip reason or failure description.
    pub detail: Option<String>,
}

/// Per-entry counters for tasks that walk many links or tools.
///
/// # Examples
///
/// ```
/// use dotlink::logging::Tally;
///
/// let tally = Tally { changed: 2, already_ok: 5, backed_up: 1, failed: 0 };
/// assert_eq!(tally.summary(), "2 changed, 5 already ok, 1 backed up");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    /// Entries created or installed.
    pub changed: u32,
    /// Entries already in the desired state.
    pub already_ok: u32,
    /// Changed entries whose previous occupant was moved to a backup.
    pub backed_up: u32,
    /// Entries that failed.
    pub failed: u32,
}

impl Tally {
    /// `"N changed, M already ok"`, plus backups and failures when non-zero.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![
            format!("{} changed", self.changed),
            format!("{} already ok", self.already_ok),
        ];
        if self.backed_up > 0 {
            parts.push(format!("{} backed up", self.backed_up));
        }
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed));
        }
        parts.join(", ")
    }

    /// Number of entries counted. Backups are a subset of `changed`.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.changed + self.already_ok + self.failed
    }

    /// Whether nothing was counted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, rhs: Self) {
        self.changed += rhs.changed;
        self.already_ok += rhs.already_ok;
        self.backed_up += rhs.backed_up;
        self.failed += rhs.failed;
    }
}

/// Logging sink handed to the reconciler and to every task.
///
/// There is no global logger: callers pass a `&dyn Log` (or
/// `Arc<dyn Log>`) explicitly, which lets tests capture output with their
/// own implementation.
pub trait Log: Send + Sync {
    /// Log a stage header (one per task).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log what a dry run would have done.
    fn dry_run(&self, msg: &str);
    /// Record how a task ended.
    fn record_task(&self, name: &str, status: TaskStatus, detail: Option<&str>);
    /// Add one link pass to the run-wide link counts.
    fn record_links(&self, tally: Tally);
}
