//! Task that configures the shell hook.

use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::shell::{self, HookOutcome, Shell};

/// Prepend the `dotfiles hook` line to the user's shell rc file.
#[derive(Debug)]
pub struct ConfigureShellHook;

impl Task for ConfigureShellHook {
    fn name(&self) -> &'static str {
        "Configure shell hook"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.config.settings.shell.hook
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let shell = match Shell::detect(ctx.shell_var.as_deref()) {
            Ok(shell) => shell,
            Err(e) => return Ok(TaskResult::Skipped(e.to_string())),
        };
        let rc = shell.rc_file(ctx.home());
        ctx.log
            .debug(&format!("{shell} rc file: {}", rc.display()));

        if ctx.dry_run {
            if shell::has_hook(&shell::read_rc(&rc)?) {
                ctx.log
                    .info(&format!("hook already present in {}", rc.display()));
            } else {
                ctx.log
                    .dry_run(&format!("would prepend hook to {}", rc.display()));
            }
            return Ok(TaskResult::DryRun);
        }

        match shell::install_hook(&rc, shell)? {
            HookOutcome::Installed => {
                ctx.log.info(&format!("added hook to {}", rc.display()));
            }
            HookOutcome::AlreadyPresent => {
                ctx.log
                    .info(&format!("hook already present in {}", rc.display()));
            }
        }
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::config::{Settings, ShellSection};
    use crate::logging::test_helpers::CaptureLog;
    use crate::tasks::test_helpers::{config_with_home, make_captured_context};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn fixture(shell_var: Option<&str>) -> (tempfile::TempDir, Context, Arc<CaptureLog>) {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_with_home(PathBuf::from("/dotfiles"), tmp.path().to_path_buf());
        let (ctx, log) = make_captured_context(config);
        let ctx = ctx.with_shell_var(shell_var.map(String::from));
        (tmp, ctx, log)
    }

    #[test]
    fn disabled_by_settings() {
        let mut config = config_with_home(PathBuf::from("/d"), PathBuf::from("/h"));
        config.settings = Settings {
            shell: ShellSection { hook: false },
            ..Settings::default()
        };
        let (ctx, _) = make_captured_context(config);
        assert!(!ConfigureShellHook.should_run(&ctx));
    }

    #[test]
    fn installs_hook_into_zshrc() {
        let (tmp, ctx, log) = fixture(Some("/usr/bin/zsh"));
        assert!(matches!(ConfigureShellHook.run(&ctx).unwrap(), TaskResult::Ok));
        let contents = std::fs::read_to_string(tmp.path().join(".zshrc")).unwrap();
        assert!(contents.starts_with("eval \"$(dotfiles hook --shell zsh)\""));
        assert!(log.contains("added hook"));
    }

    #[test]
    fn second_run_leaves_rc_alone() {
        let (tmp, ctx, log) = fixture(Some("/bin/bash"));
        ConfigureShellHook.run(&ctx).unwrap();
        let first = std::fs::read_to_string(tmp.path().join(".bashrc")).unwrap();
        ConfigureShellHook.run(&ctx).unwrap();
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(".bashrc")).unwrap(),
            first
        );
        assert!(log.contains("hook already present"));
    }

    #[test]
    fn unsupported_shell_is_skipped() {
        let (_tmp, ctx, _) = fixture(Some("/usr/bin/fish"));
        let TaskResult::Skipped(reason) = ConfigureShellHook.run(&ctx).unwrap() else {
            panic!("expected skip");
        };
        assert!(reason.contains("fish"));
    }

    #[test]
    fn dry_run_does_not_write() {
        let (tmp, ctx, log) = fixture(Some("/bin/zsh"));
        let ctx = Context {
            dry_run: true,
            ..ctx
        };
        assert!(matches!(
            ConfigureShellHook.run(&ctx).unwrap(),
            TaskResult::DryRun
        ));
        assert!(!tmp.path().join(".zshrc").exists());
        assert!(log.contains("[dry run] would prepend hook"));
    }
}
