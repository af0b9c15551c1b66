//! Named units of work run by the `install` command.
pub mod context;
pub mod links;
pub mod shell;
pub mod tools;

pub use context::Context;

use anyhow::Result;

use crate::logging::TaskStatus;

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use dotlink::tasks::TaskResult;
///
/// let skipped = TaskResult::Skipped("no .config directory".into());
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task had nothing to do for the given reason.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task applies to the current run.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task, or any entry it processes, fails.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The complete set of tasks run by the install command, in order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(links::LinkHome),
        Box::new(links::LinkConfig),
        Box::new(shell::ConfigureShellHook),
        Box::new(tools::InstallTools),
    ]
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}

/// Shared helpers for task unit tests.
#[cfg(test)]
pub(crate) mod test_helpers {
    use std::path::PathBuf;
    use std::sync::Arc;

    use crate::config::{Config, Settings};
    use crate::logging::test_helpers::CaptureLog;
    use crate::operations::SystemFileSystemOps;
    use crate::tools::test_helpers::FakeExecutor;

    use super::Context;

    /// Build a [`Config`] with default settings, `root` as given and home at
    /// `/home/test`.
    #[must_use]
    pub fn empty_config(root: PathBuf) -> Config {
        config_with_home(root, PathBuf::from("/home/test"))
    }

    /// Build a [`Config`] with default settings for the given root and home.
    #[must_use]
    pub fn config_with_home(root: PathBuf, home: PathBuf) -> Config {
        Config {
            root,
            config_dir: home.join(".config"),
            home,
            settings: Settings::default(),
        }
    }

    /// Build a sequential, non-dry-run [`Context`] with an empty-`PATH`
    /// executor and no `$SHELL`.
    #[must_use]
    pub fn make_context(config: Config) -> Context {
        Context {
            config: Arc::new(config),
            log: Arc::new(CaptureLog::default()),
            dry_run: false,
            parallel: false,
            executor: Arc::new(FakeExecutor::default()),
            fs_ops: Arc::new(SystemFileSystemOps),
            shell_var: None,
        }
    }

    /// Like [`make_context`], also returning the [`CaptureLog`] so tests can
    /// inspect messages and recorded task state.
    #[must_use]
    pub fn make_captured_context(config: Config) -> (Context, Arc<CaptureLog>) {
        let log = Arc::new(CaptureLog::default());
        let ctx = make_context(config).with_log(Arc::clone(&log) as Arc<dyn crate::logging::Log>);
        (ctx, log)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_helpers::{empty_config, make_captured_context};

    /// A canned task for testing `execute()`.
    struct CannedTask {
        name: &'static str,
        should_run: bool,
        result: Result<TaskResult, String>,
    }

    impl Task for CannedTask {
        fn name(&self) -> &str {
            self.name
        }
        fn should_run(&self, _ctx: &Context) -> bool {
            self.should_run
        }
        fn run(&self, _ctx: &Context) -> Result<TaskResult> {
            self.result.clone().map_err(|s| anyhow::anyhow!("{s}"))
        }
    }

    fn run_canned(should_run: bool, result: Result<TaskResult, String>) -> Vec<TaskStatus> {
        let (ctx, log) = make_captured_context(empty_config(PathBuf::from("/tmp")));
        execute(
            &CannedTask {
                name: "canned",
                should_run,
                result,
            },
            &ctx,
        );
        log.tasks().iter().map(|t| t.status).collect()
    }

    #[test]
    fn execute_records_not_applicable() {
        assert_eq!(
            run_canned(false, Ok(TaskResult::Ok)),
            vec![TaskStatus::NotApplicable]
        );
    }

    #[test]
    fn execute_records_ok() {
        assert_eq!(run_canned(true, Ok(TaskResult::Ok)), vec![TaskStatus::Ok]);
    }

    #[test]
    fn execute_records_skipped() {
        assert_eq!(
            run_canned(true, Ok(TaskResult::Skipped("nothing".into()))),
            vec![TaskStatus::Skipped]
        );
    }

    #[test]
    fn execute_records_dry_run() {
        assert_eq!(
            run_canned(true, Ok(TaskResult::DryRun)),
            vec![TaskStatus::DryRun]
        );
    }

    #[test]
    fn execute_records_failure_with_message() {
        let (ctx, log) = make_captured_context(empty_config(PathBuf::from("/tmp")));
        execute(
            &CannedTask {
                name: "fail-task",
                should_run: true,
                result: Err("kaboom".to_string()),
            },
            &ctx,
        );
        let tasks = log.tasks();
        assert_eq!(tasks[0].status, TaskStatus::Failed);
        assert_eq!(tasks[0].detail.as_deref(), Some("kaboom"));
        assert!(log.contains("fail-task: kaboom"));
    }

    #[test]
    fn install_task_order() {
        let names: Vec<String> = all_install_tasks()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "Link home entries",
                "Link config entries",
                "Configure shell hook",
                "Install tools"
            ]
        );
    }
}
