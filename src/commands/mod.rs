//! Top-level subcommand implementations.
pub mod completions;
pub mod hook;
pub mod install;
pub mod tools;
pub mod version;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::Logger;
use crate::tasks::{self, Context, Task};

/// Resolve the dotfiles root and load `dotfiles.toml`, logging what was found.
///
/// # Errors
///
/// Returns an error if `HOME` is unset or the settings file is invalid.
pub fn load_config(global: &GlobalOpts, log: &Logger) -> Result<Config> {
    log.stage("Loading configuration");
    let config = Config::load(global.root.as_deref())?;
    log.info(&format!("dotfiles root: {}", config.root.display()));
    log.debug(&format!("home: {}", config.home.display()));
    log.debug(&format!(
        "{} home exclusion(s), {} config exclusion(s)",
        config.home_excludes().len(),
        config.config_excludes().len()
    ));
    Ok(config)
}

/// Execute every task in order, print the summary, and bail if any task failed.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        tasks::execute(task, ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}
