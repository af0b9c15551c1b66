//! Link every entry of the dotfiles store into `$HOME` and `$HOME/.config`.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use rayon::prelude::*;

use super::{Context, Task, TaskResult};
use crate::error::{ReconcileError, ReconcileErrorKind};
use crate::logging::Tally;
use crate::reconcile::{Reconciled, Reconciler};

/// Link the entries of `<root>/data/home` (minus `.config`) into `$HOME`.
#[derive(Debug)]
pub struct LinkHome;

impl Task for LinkHome {
    fn name(&self) -> &'static str {
        "Link home entries"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let source = ctx.config.home_source_dir();
        let dest = ctx.config.home.clone();
        link_dir(ctx, &source, &dest, &ctx.config.home_excludes())
    }
}

/// Link the entries of `<root>/data/home/.config` into `$HOME/.config`.
#[derive(Debug)]
pub struct LinkConfig;

impl Task for LinkConfig {
    fn name(&self) -> &'static str {
        "Link config entries"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let source = ctx.config.config_source_dir();
        if !ctx.fs_ops.exists_no_follow(&source) {
            return Ok(TaskResult::Skipped(format!(
                "{} does not exist",
                source.display()
            )));
        }

        let dest = ctx.config.config_dir.clone();
        if !ctx.dry_run {
            ctx.fs_ops
                .create_dir_all(&dest)
                .with_context(|| format!("creating {}", dest.display()))?;
        }
        link_dir(ctx, &source, &dest, &ctx.config.config_excludes())
    }
}

/// One `(target, link)` pair derived from a source directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    /// Path inside the dotfiles store.
    pub target: PathBuf,
    /// Where the symlink goes.
    pub link: PathBuf,
}

/// Map each entry of `source` not named in `excludes` to a link of the same
/// name in `dest`.
///
/// # Errors
///
/// Returns an error if `source` cannot be read.
pub fn plan_links(
    ctx: &Context,
    source: &Path,
    dest: &Path,
    excludes: &[String],
) -> Result<Vec<LinkEntry>> {
    let entries = ctx
        .fs_ops
        .read_dir(source)
        .with_context(|| format!("reading {}", source.display()))?;
    Ok(entries
        .into_iter()
        .filter_map(|target| {
            let name = target.file_name()?.to_owned();
            if excludes.iter().any(|e| name == e.as_str()) {
                return None;
            }
            Some(LinkEntry {
                link: dest.join(&name),
                target,
            })
        })
        .collect())
}

fn link_dir(ctx: &Context, source: &Path, dest: &Path, excludes: &[String]) -> Result<TaskResult> {
    let entries = plan_links(ctx, source, dest, excludes)?;
    ctx.log.debug(&format!(
        "{} entries in {}",
        entries.len(),
        source.display()
    ));

    if entries.is_empty() {
        return Ok(TaskResult::Skipped(format!(
            "nothing to link in {}",
            source.display()
        )));
    }

    if ctx.dry_run {
        for entry in &entries {
            ctx.log.dry_run(&format!(
                "would link {} -> {}",
                entry.link.display(),
                entry.target.display()
            ));
        }
        return Ok(TaskResult::DryRun);
    }

    let stats = if ctx.parallel {
        entries
            .par_iter()
            .map(|entry| link_one(ctx, entry))
            .reduce(Tally::default, |mut a, b| {
                a += b;
                a
            })
    } else {
        entries
            .iter()
            .map(|entry| link_one(ctx, entry))
            .fold(Tally::default(), |mut a, b| {
                a += b;
                a
            })
    };

    ctx.log.info(&stats.summary());
    ctx.log.record_links(stats);
    if stats.failed > 0 {
        bail!("{} of {} link(s) failed", stats.failed, stats.total());
    }
    Ok(TaskResult::Ok)
}

/// Reconcile one entry, logging its failure instead of propagating it so the
/// remaining entries still run.
fn link_one(ctx: &Context, entry: &LinkEntry) -> Tally {
    let reconciler = Reconciler::new(&*ctx.fs_ops, &*ctx.log);
    match reconciler.reconcile(&entry.target, &entry.link) {
        Ok(Reconciled::Created) => Tally {
            changed: 1,
            ..Tally::default()
        },
        Ok(Reconciled::BackedUp { .. }) => Tally {
            changed: 1,
            backed_up: 1,
            ..Tally::default()
        },
        Ok(Reconciled::AlreadyCorrect) => Tally {
            already_ok: 1,
            ..Tally::default()
        },
        Err(e) => {
            report_failure(ctx, &e);
            Tally {
                failed: 1,
                ..Tally::default()
            }
        }
    }
}

fn report_failure(ctx: &Context, err: &ReconcileError) {
    ctx.log.error(&err.to_string());
    let link = err.link().display();
    match err {
        ReconcileError::RestoreFailed { backup, .. } => ctx.log.warn(&format!(
            "previous contents of {link} are preserved at {}",
            backup.display()
        )),
        _ if err.kind() == ReconcileErrorKind::SymlinkConflict => ctx.log.warn(&format!(
            "remove {link} by hand if it should point into the dotfiles store"
        )),
        _ => {}
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::test_helpers::CaptureLog;
    use crate::operations::MockFileSystemOps;
    use crate::tasks::test_helpers::{config_with_home, make_captured_context};
    use std::io;
    use std::sync::Arc;

    /// A dotfiles root and a home directory side by side in one temp dir.
    struct Fixture {
        _tmp: tempfile::TempDir,
        root: PathBuf,
        home: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let root = tmp.path().join("dotfiles");
            let home = tmp.path().join("home");
            std::fs::create_dir_all(root.join("data/home/.config/nvim")).unwrap();
            std::fs::create_dir_all(&home).unwrap();
            std::fs::write(root.join("data/home/.bashrc"), "new bashrc").unwrap();
            std::fs::write(root.join("data/home/.gitconfig"), "[user]").unwrap();
            std::fs::write(root.join("data/home/.config/nvim/init.lua"), "--").unwrap();
            Self {
                _tmp: tmp,
                root,
                home,
            }
        }

        fn source(&self, rel: &str) -> PathBuf {
            self.root.join("data/home").join(rel)
        }

        fn context(&self) -> (Context, Arc<CaptureLog>) {
            make_captured_context(config_with_home(self.root.clone(), self.home.clone()))
        }
    }

    #[test]
    fn plan_excludes_config_dir() {
        let fx = Fixture::new();
        let (ctx, _) = fx.context();
        let plan = plan_links(
            &ctx,
            &ctx.config.home_source_dir(),
            &fx.home,
            &ctx.config.home_excludes(),
        )
        .unwrap();
        let links: Vec<_> = plan.iter().map(|e| e.link.clone()).collect();
        assert_eq!(links, vec![fx.home.join(".bashrc"), fx.home.join(".gitconfig")]);
        assert_eq!(plan[0].target, fx.source(".bashrc"));
    }

    #[cfg(unix)]
    #[test]
    fn link_home_creates_links_and_skips_config() {
        let fx = Fixture::new();
        let (ctx, _) = fx.context();

        assert!(matches!(LinkHome.run(&ctx).unwrap(), TaskResult::Ok));
        assert_eq!(
            std::fs::read_link(fx.home.join(".bashrc")).unwrap(),
            fx.source(".bashrc")
        );
        assert!(!fx.home.join(".config").exists());
    }

    #[cfg(unix)]
    #[test]
    fn link_home_in_parallel_matches_sequential() {
        let fx = Fixture::new();
        let (ctx, log) = fx.context();
        let ctx = Context {
            parallel: true,
            ..ctx.with_log(log.clone())
        };

        assert!(matches!(LinkHome.run(&ctx).unwrap(), TaskResult::Ok));
        assert!(log.contains("2 changed, 0 already ok"));
        assert!(fx.home.join(".gitconfig").is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn link_config_creates_config_dir() {
        let fx = Fixture::new();
        let (ctx, _) = fx.context();

        assert!(matches!(LinkConfig.run(&ctx).unwrap(), TaskResult::Ok));
        assert_eq!(
            std::fs::read_link(fx.home.join(".config/nvim")).unwrap(),
            fx.source(".config/nvim")
        );
    }

    #[test]
    fn link_config_skips_without_source() {
        let fx = Fixture::new();
        std::fs::remove_dir_all(fx.source(".config")).unwrap();
        let (ctx, _) = fx.context();

        assert!(matches!(
            LinkConfig.run(&ctx).unwrap(),
            TaskResult::Skipped(_)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn second_run_reports_already_ok() {
        let fx = Fixture::new();
        let (ctx, log) = fx.context();
        LinkHome.run(&ctx).unwrap();
        LinkHome.run(&ctx).unwrap();
        assert!(log.contains("0 changed, 2 already ok"));
        assert_eq!(
            log.links(),
            Tally {
                changed: 2,
                already_ok: 2,
                ..Tally::default()
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn existing_file_is_backed_up() {
        let fx = Fixture::new();
        std::fs::write(fx.home.join(".bashrc"), "old config").unwrap();
        let (ctx, log) = fx.context();

        LinkHome.run(&ctx).unwrap();
        assert!(log.contains("1 backed up"));
        assert_eq!(log.links().backed_up, 1);
        let backup = std::fs::read_dir(&fx.home)
            .unwrap()
            .map(|e| e.unwrap().path())
            .find(|p| {
                p.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with(".bashrc.backup.")
            })
            .expect("backup file");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "old config");
    }

    #[cfg(unix)]
    #[test]
    fn failing_entry_does_not_stop_the_others() {
        let fx = Fixture::new();
        std::os::unix::fs::symlink("/elsewhere", fx.home.join(".bashrc")).unwrap();
        let (ctx, log) = fx.context();

        let err = LinkHome.run(&ctx).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 link(s) failed");
        assert!(fx.home.join(".gitconfig").is_symlink());
        assert_eq!(
            std::fs::read_link(fx.home.join(".bashrc")).unwrap(),
            PathBuf::from("/elsewhere")
        );
        assert!(log.contains(&format!(
            "remove {} by hand",
            fx.home.join(".bashrc").display()
        )));
        assert_eq!(log.links().failed, 1);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let fx = Fixture::new();
        let (ctx, log) = fx.context();
        let ctx = Context {
            dry_run: true,
            ..ctx.with_log(log.clone())
        };

        assert!(matches!(LinkHome.run(&ctx).unwrap(), TaskResult::DryRun));
        assert!(matches!(LinkConfig.run(&ctx).unwrap(), TaskResult::DryRun));
        assert!(log.contains("[dry run] would link"));
        assert!(log.links().is_empty());
        assert_eq!(std::fs::read_dir(&fx.home).unwrap().count(), 0);
    }

    #[test]
    fn dry_run_never_calls_the_reconciler() {
        let fx = Fixture::new();
        let mut fs = MockFileSystemOps::new();
        fs.expect_read_dir()
            .returning(|_| Ok(vec![PathBuf::from("/d/.bashrc")]));
        fs.expect_symlink().never();
        fs.expect_rename().never();
        let (ctx, _) = fx.context();
        let ctx = Context {
            dry_run: true,
            ..ctx.with_fs_ops(Arc::new(fs))
        };

        assert!(matches!(LinkHome.run(&ctx).unwrap(), TaskResult::DryRun));
    }

    #[test]
    fn unreadable_source_fails_the_task() {
        let fx = Fixture::new();
        let mut fs = MockFileSystemOps::new();
        fs.expect_read_dir()
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied).into()));
        let (ctx, _) = fx.context();
        let ctx = ctx.with_fs_ops(Arc::new(fs));

        let err = LinkHome.run(&ctx).unwrap_err();
        assert!(format!("{err:#}").starts_with("reading "));
    }

    #[test]
    fn empty_source_is_skipped() {
        let fx = Fixture::new();
        let mut fs = MockFileSystemOps::new();
        fs.expect_read_dir().returning(|_| Ok(vec![]));
        let (ctx, _) = fx.context();
        let ctx = ctx.with_fs_ops(Arc::new(fs));

        assert!(matches!(
            LinkHome.run(&ctx).unwrap(),
            TaskResult::Skipped(_)
        ));
    }
}
