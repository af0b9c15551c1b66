//! Shared execution context for tasks.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};

/// Everything a task needs: paths, settings, output and the side-effect seams.
///
/// Cloning is cheap; the `with_*` builders return a copy with one seam
/// replaced.
#[derive(Clone)]
pub struct Context {
    /// Resolved paths and settings.
    pub config: Arc<Config>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (report intended changes, mutate nothing).
    pub dry_run: bool,
    /// Whether to reconcile link entries in parallel using Rayon.
    pub parallel: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Filesystem operation abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
    /// Value of `$SHELL` at startup, used to pick the rc file to hook.
    pub shell_var: Option<String>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("parallel", &self.parallel)
            .field("executor", &self.executor)
            .field("fs_ops", &self.fs_ops)
            .field("shell_var", &self.shell_var)
            .finish()
    }
}

impl Context {
    /// Creates a context backed by the real filesystem and process spawner.
    #[must_use]
    pub fn new(config: Arc<Config>, log: Arc<dyn Log>, dry_run: bool, parallel: bool) -> Self {
        Self {
            config,
            log,
            dry_run,
            parallel,
            executor: Arc::new(SystemExecutor),
            fs_ops: Arc::new(SystemFileSystemOps),
            shell_var: std::env::var("SHELL").ok(),
        }
    }

    /// The user's home directory.
    #[must_use]
    pub fn home(&self) -> &PathBuf {
        &self.config.home
    }

    /// Create a copy of this context with a different logger.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            log,
            ..self.clone()
        }
    }

    /// Create a copy of this context with a different [`FileSystemOps`] implementation.
    #[must_use]
    pub fn with_fs_ops(&self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        Self {
            fs_ops,
            ..self.clone()
        }
    }

    /// Create a copy of this context with a different [`Executor`].
    #[must_use]
    pub fn with_executor(&self, executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            ..self.clone()
        }
    }

    /// Create a copy of this context with a different `$SHELL` value.
    #[must_use]
    pub fn with_shell_var(&self, shell_var: Option<String>) -> Self {
        Self {
            shell_var,
            ..self.clone()
        }
    }
}
