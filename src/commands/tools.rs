//! Command: list or install the command-line tools.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, ToolsCommand};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{Log, Logger};
use crate::tasks::{Context, Task, tools::InstallTools};
use crate::tools::{self, Tool};

/// Run a `tools` subcommand.
///
/// # Errors
///
/// Returns an error if configuration loading fails or a tool fails to install.
pub fn run(global: &GlobalOpts, cmd: ToolsCommand, log: &Arc<Logger>) -> Result<()> {
    let config = super::load_config(global, log)?;
    match cmd {
        ToolsCommand::List => {
            let enabled = &config.settings.tools.enabled;
            tools::warn_unknown(enabled, &**log);
            let selected = tools::selected(enabled);
            for line in status_lines(&selected, &SystemExecutor) {
                println!("{line}");
            }
            Ok(())
        }
        ToolsCommand::Install => {
            let ctx = Context::new(
                Arc::new(config),
                Arc::clone(log) as Arc<dyn Log>,
                global.dry_run,
                global.parallel,
            );
            super::run_tasks_to_completion([&InstallTools as &dyn Task], &ctx, log)
        }
    }
}

/// One line per tool: a check mark or cross, then the tool description.
#[must_use]
pub fn status_lines(tools: &[Tool], exec: &dyn Executor) -> Vec<String> {
    tools
        .iter()
        .map(|tool| {
            let mark = if tool.is_installed(exec) { "✓" } else { "✗" };
            format!("{mark} {tool}")
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tools::ALL_TOOLS;
    use crate::tools::test_helpers::FakeExecutor;

    #[test]
    fn status_lines_mark_installed_tools() {
        let exec = FakeExecutor::with_path(&["rg", "nvim"]);
        insta::assert_snapshot!(status_lines(ALL_TOOLS, &exec).join("\n"), @r"
        ✗ eza (cargo)
        ✓ rg (cargo ripgrep)
        ✗ fd (cargo fd-find)
        ✓ nvim (brew)
        ");
    }
}
