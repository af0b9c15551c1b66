// Shared helpers for integration tests.
//
// Provides a temporary dotfiles store next to a temporary home directory and
// a fluent builder so each integration test can set up an isolated
// environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Result, bail};

use dotlink::config::Config;
use dotlink::exec::{ExecResult, Executor};
use dotlink::logging::{Log, Logger};
use dotlink::operations::SystemFileSystemOps;
use dotlink::tasks::Context;

/// Executor that reports every program as installed and refuses to run
/// anything.
#[derive(Debug, Default)]
pub struct EverythingInstalled;

impl Executor for EverythingInstalled {
    fn run(&self, program: &str, _: &[&str]) -> Result<ExecResult> {
        bail!("{program} must not be spawned from integration tests")
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.run(program, args)
    }

    fn which(&self, _: &str) -> bool {
        true
    }
}

/// A dotfiles store at `<tmp>/dotfiles` and a home directory at `<tmp>/home`.
///
/// Both are deleted when dropped (via the underlying [`tempfile::TempDir`]).
pub struct TestEnv {
    tmp: tempfile::TempDir,
}

impl TestEnv {
    /// Create the store with an empty `data/home` and an empty home.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(tmp.path().join("dotfiles/data/home")).expect("create store");
        std::fs::create_dir_all(tmp.path().join("home")).expect("create home");
        Self { tmp }
    }

    /// The dotfiles root.
    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("dotfiles")
    }

    /// The fake `$HOME`.
    pub fn home(&self) -> PathBuf {
        self.tmp.path().join("home")
    }

    /// Path of `rel` inside `data/home`.
    pub fn source(&self, rel: &str) -> PathBuf {
        self.root().join("data/home").join(rel)
    }

    /// Resolve configuration as the CLI would, with `HOME` pointing at the
    /// fake home.
    pub fn config(&self) -> Config {
        let home = self.home().to_string_lossy().into_owned();
        let root = self.root();
        Config::load_with_env(Some(root.as_path()), |key| {
            (key == "HOME").then(|| home.clone())
        })
        .expect("load config")
    }

    /// A context over the real filesystem with a zsh `$SHELL`.
    pub fn context(&self, log: &Arc<Logger>, dry_run: bool, parallel: bool) -> Context {
        Context {
            config: Arc::new(self.config()),
            log: Arc::clone(log) as Arc<dyn Log>,
            dry_run,
            parallel,
            executor: Arc::new(EverythingInstalled),
            fs_ops: Arc::new(SystemFileSystemOps),
            shell_var: Some("/bin/zsh".to_string()),
        }
    }
}

/// Fluent builder for [`TestEnv`].
pub struct TestEnvBuilder {
    env: TestEnv,
}

impl TestEnvBuilder {
    /// Begin building a new environment with an empty store.
    pub fn new() -> Self {
        Self {
            env: TestEnv::new(),
        }
    }

    /// Write `content` to `data/home/<rel>`, creating parents.
    pub fn with_source_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.env.source(rel), content);
        self
    }

    /// Write `content` to `<home>/<rel>`, creating parents.
    pub fn with_home_file(self, rel: &str, content: &str) -> Self {
        write_file(&self.env.home().join(rel), content);
        self
    }

    /// Write `dotfiles.toml` at the root.
    pub fn with_settings(self, toml: &str) -> Self {
        write_file(&self.env.root().join("dotfiles.toml"), toml);
        self
    }

    /// Finish building and return the environment.
    pub fn build(self) -> TestEnv {
        self.env
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write file");
}

/// A logger that keeps task results in memory and writes no log file.
pub fn quiet_logger() -> Arc<Logger> {
    Arc::new(Logger::with_log_file(None))
}
