//! Command: link the dotfiles store into place and configure the shell.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context, Task};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if configuration loading fails, the source directory is
/// missing, or any task fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("dotfiles {}", super::version::version_string()));

    let config = super::load_config(global, log)?;
    config.ensure_source_dir()?;
    if global.dry_run {
        log.info("dry run: no changes will be made");
    }

    let ctx = Context::new(
        Arc::new(config),
        Arc::clone(log) as Arc<dyn Log>,
        global.dry_run,
        global.parallel,
    );

    let all_tasks = tasks::all_install_tasks();
    let selected = filter_tasks(&all_tasks, opts);
    super::run_tasks_to_completion(selected, &ctx, log)
}

/// Apply `--only`, `--skip` and `--no-tools` to the task list.
///
/// Matching is a case-insensitive substring test on the task name. When
/// `--only` is given `--skip` is ignored.
#[must_use]
pub fn filter_tasks<'a>(tasks: &'a [Box<dyn Task>], opts: &InstallOpts) -> Vec<&'a dyn Task> {
    let mut skip = opts.skip.clone();
    if opts.no_tools {
        skip.push("tools".to_string());
    }
    tasks
        .iter()
        .filter(|t| {
            let name = t.name().to_lowercase();
            if !opts.only.is_empty() {
                return opts.only.iter().any(|o| name.contains(&o.to_lowercase()));
            }
            !skip.iter().any(|s| name.contains(&s.to_lowercase()))
        })
        .map(AsRef::as_ref)
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn names(opts: &InstallOpts) -> Vec<String> {
        let all = tasks::all_install_tasks();
        filter_tasks(&all, opts)
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    #[test]
    fn no_filters_keeps_everything() {
        assert_eq!(names(&InstallOpts::default()).len(), 4);
    }

    #[test]
    fn only_link_selects_both_link_tasks() {
        let opts = InstallOpts {
            only: vec!["LINK".to_string()],
            ..InstallOpts::default()
        };
        assert_eq!(names(&opts), vec!["Link home entries", "Link config entries"]);
    }

    #[test]
    fn skip_removes_matching_tasks() {
        let opts = InstallOpts {
            skip: vec!["shell".to_string(), "config".to_string()],
            ..InstallOpts::default()
        };
        assert_eq!(names(&opts), vec!["Link home entries", "Install tools"]);
    }

    #[test]
    fn no_tools_skips_tool_install() {
        let opts = InstallOpts {
            no_tools: true,
            ..InstallOpts::default()
        };
        assert!(!names(&opts).iter().any(|n| n.contains("tools")));
    }
}
