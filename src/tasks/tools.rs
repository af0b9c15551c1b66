//! Task that installs tools.

use anyhow::{Result, bail};

use super::{Context, Task, TaskResult};
use crate::logging::Tally;
use crate::tools;

/// Install the command-line tools the dotfiles rely on.
#[derive(Debug)]
pub struct InstallTools;

impl Task for InstallTools {
    fn name(&self) -> &'static str {
        "Install tools"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let enabled = &ctx.config.settings.tools.enabled;
        tools::warn_unknown(enabled, &*ctx.log);
        let selected = tools::selected(enabled);
        if selected.is_empty() {
            return Ok(TaskResult::Skipped("no tools selected".to_string()));
        }

        let mut stats = Tally::default();
        for tool in &selected {
            if tool.is_installed(&*ctx.executor) {
                ctx.log.debug(&format!("ok: {} already installed", tool.binary));
                stats.already_ok += 1;
            } else if ctx.dry_run {
                ctx.log.dry_run(&format!("would install {tool}"));
                stats.changed += 1;
            } else {
                ctx.log.info(&format!("installing {tool}"));
                match tool.install(&*ctx.executor) {
                    Ok(()) => stats.changed += 1,
                    Err(e) => {
                        ctx.log.error(&format!("{}: {e:#}", tool.binary));
                        stats.failed += 1;
                    }
                }
            }
        }

        ctx.log.info(&stats.summary());
        if stats.failed > 0 {
            bail!("{} of {} tool(s) failed to install", stats.failed, stats.total());
        }
        if ctx.dry_run {
            return Ok(TaskResult::DryRun);
        }
        Ok(TaskResult::Ok)
    }
}
