//! The production [`Log`]: forwards to `tracing` and keeps the run summary.
use std::path::PathBuf;
use std::sync::Mutex;

use super::file::log_file_path;
use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, Tally, TaskRecord, TaskStatus};

/// Emits every message as a [`tracing`] event and remembers task records
/// and link counts until [`print_summary`](Self::print_summary).
#[derive(Debug, Default)]
pub struct Logger {
    tasks: Mutex<Vec<TaskRecord>>,
    links: Mutex<Tally>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command`; the summary points at its log file.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger whose summary names `log_file`, if any.
    #[must_use]
    pub fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            log_file,
            ..Self::default()
        }
    }

    /// Every task recorded so far, in order.
    #[must_use]
    pub fn records(&self) -> Vec<TaskRecord> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Link counts summed over every link pass.
    #[must_use]
    pub fn links(&self) -> Tally {
        self.links.lock().map_or_else(|_| Tally::default(), |g| *g)
    }

    /// Number of tasks recorded as failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.records()
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header.
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log what a dry run would have done.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Print one aligned line per task, then the link counts and where the
    /// log file is.
    pub fn print_summary(&self) {
        let tasks = self.records();
        if tasks.is_empty() {
            return;
        }

        self.stage("Summary");
        let width = tasks.iter().map(|t| t.name.len()).max().unwrap_or(0);
        for task in &tasks {
            let line = match &task.detail {
                Some(detail) => format!("{:<width$}  {}: {detail}", task.name, task.status.label()),
                None => format!("{:<width$}  {}", task.name, task.status.label()),
            };
            if task.status == TaskStatus::Failed {
                self.error(&line);
            } else {
                self.info(&line);
            }
        }

        let links = self.links();
        if !links.is_empty() {
            self.info(&format!("links: {}", links.summary()));
        }
        if links.backed_up > 0 {
            self.info("previous files were kept as <name>.backup.<timestamp> next to each link");
        }
        if let Some(path) = &self.log_file {
            self.info(&format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        self.stage(msg);
    }

    fn info(&self, msg: &str) {
        self.info(msg);
    }

    fn debug(&self, msg: &str) {
        self.debug(msg);
    }

    fn warn(&self, msg: &str) {
        self.warn(msg);
    }

    fn error(&self, msg: &str) {
        self.error(msg);
    }

    fn dry_run(&self, msg: &str) {
        self.dry_run(msg);
    }

    fn record_task(&self, name: &str, status: TaskStatus, detail: Option<&str>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(TaskRecord {
                name: name.to_string(),
                status,
                detail: detail.map(String::from),
            });
        }
    }

    fn record_links(&self, tally: Tally) {
        if let Ok(mut links) = self.links.lock() {
            *links += tally;
        }
    }
}
