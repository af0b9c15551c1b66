//! Symlink-and-backup reconciliation.
//!
//! [`Reconciler::reconcile`] makes `link` a symbolic link to `target`:
//!
//! 1. try to create the link outright, so there is no window between a
//!    check and the creation;
//! 2. only if that fails because the path is occupied, look at what is
//!    there: the right symlink is a no-op, a different symlink is refused,
//!    anything else is renamed to a timestamped backup and creation is
//!    retried once;
//! 3. if the retry fails the backup is moved back, and if *that* fails the
//!    caller gets a [`ReconcileError::RestoreFailed`] naming both causes.
//!
//! Nothing is ever deleted.
use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::ReconcileError;
use crate::logging::Log;
use crate::operations::FileSystemOps;

/// `strftime` format of the backup suffix: `YYYY-MM-DD_HH:MM:SS`.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M:%S";

/// How a successful reconciliation got there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// Nothing occupied the link path; a new symlink was created.
    Created,
    /// The link already pointed at the target; nothing was touched.
    AlreadyCorrect,
    /// The previous occupant was moved to `backup` and the link created.
    BackedUp {
        /// Where the previous occupant now lives.
        backup: PathBuf,
    },
}

/// Reconciles one `(target, link)` pair at a time against a filesystem.
pub struct Reconciler<'a> {
    fs: &'a dyn FileSystemOps,
    log: &'a dyn Log,
    clock: fn() -> NaiveDateTime,
}

impl std::fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("fs", &self.fs)
            .field("log", &"<dyn Log>")
            .finish_non_exhaustive()
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler using the local wall clock for backup names.
    #[must_use]
    pub fn new(fs: &'a dyn FileSystemOps, log: &'a dyn Log) -> Self {
        Self {
            fs,
            log,
            clock: local_now,
        }
    }

    /// Replace the clock used to timestamp backups.
    #[must_use]
    pub const fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Make `link` a symbolic link pointing at `target`.
    ///
    /// `target` is stored verbatim; its existence is not checked.
    ///
    /// # Errors
    ///
    /// - [`ReconcileError::SymlinkConflict`] if `link` is a symlink to
    ///   somewhere else; `link` is left untouched.
    /// - [`ReconcileError::Backup`] if the occupant could not be moved aside.
    /// - [`ReconcileError::RestoreFailed`] if the retry and the restore both
    ///   failed; the occupant is left at the backup path.
    /// - [`ReconcileError::Unexpected`] for any other filesystem failure.
    /// - Whatever the retry returned, if the retry failed but the occupant
    ///   was restored.
    ///
    /// The restore is a plain rename of the backup onto `link`, not a
    /// no-clobber move. On Unix it silently replaces anything that appeared
    /// at `link` between the backup and the failed retry.
    pub fn reconcile(&self, target: &Path, link: &Path) -> Result<Reconciled, ReconcileError> {
        match self.try_create(target, link) {
            Err(ReconcileError::AlreadyExists { .. }) => self.backup_and_retry(target, link),
            other => other,
        }
    }

    /// Create the link, inspecting the occupant only if creation says the
    /// path is taken.
    fn try_create(&self, target: &Path, link: &Path) -> Result<Reconciled, ReconcileError> {
        match self.fs.symlink(target, link) {
            Ok(()) => {
                self.log.info(&format!(
                    "created symlink {} -> {}",
                    link.display(),
                    target.display()
                ));
                Ok(Reconciled::Created)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => self.inspect(target, link),
            Err(source) => Err(unexpected(target, link, source)),
        }
    }

    fn inspect(&self, target: &Path, link: &Path) -> Result<Reconciled, ReconcileError> {
        let is_symlink = self
            .fs
            .is_symlink(link)
            .map_err(|source| unexpected(target, link, source))?;
        if !is_symlink {
            return Err(ReconcileError::AlreadyExists {
                link: link.to_path_buf(),
            });
        }

        let existing = self
            .fs
            .read_link(link)
            .map_err(|source| unexpected(target, link, source))?;
        if same_target(&existing, target) {
            self.log.debug(&format!(
                "ok: {} already points to {}",
                link.display(),
                target.display()
            ));
            Ok(Reconciled::AlreadyCorrect)
        } else {
            Err(ReconcileError::SymlinkConflict {
                link: link.to_path_buf(),
                existing,
                target: target.to_path_buf(),
            })
        }
    }

    fn backup_and_retry(&self, target: &Path, link: &Path) -> Result<Reconciled, ReconcileError> {
        let backup = self.backup_path(link);
        self.fs
            .rename(link, &backup)
            .map_err(|source| ReconcileError::Backup {
                link: link.to_path_buf(),
                backup: backup.clone(),
                source,
            })?;

        match self.try_create(target, link) {
            Ok(_) => {
                self.log.info(&format!(
                    "backed up {} to {}",
                    link.display(),
                    backup.display()
                ));
                Ok(Reconciled::BackedUp { backup })
            }
            Err(retry) => match self.fs.rename(&backup, link) {
                Ok(()) => {
                    self.log.warn(&format!(
                        "restored {} after failed retry",
                        link.display()
                    ));
                    Err(retry)
                }
                Err(restore) => Err(ReconcileError::RestoreFailed {
                    link: link.to_path_buf(),
                    target: target.to_path_buf(),
                    backup,
                    retry: Box::new(retry),
                    restore,
                }),
            },
        }
    }

    /// First free backup name for `link` at the current clock reading.
    fn backup_path(&self, link: &Path) -> PathBuf {
        let stamp = (self.clock)().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let base = backup_path_for(link, &stamp);
        if !self.fs.exists_no_follow(&base) {
            return base;
        }
        (1u32..)
            .map(|n| with_suffix(&base, &n.to_string()))
            .find(|candidate| !self.fs.exists_no_follow(candidate))
            .unwrap_or(base)
    }
}

/// `<link>.backup.<stamp>`, built on the raw OS string so non-UTF-8 names
/// survive.
#[must_use]
pub fn backup_path_for(link: &Path, stamp: &str) -> PathBuf {
    with_suffix(link, &format!("backup.{stamp}"))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn unexpected(target: &Path, link: &Path, source: io::Error) -> ReconcileError {
    ReconcileError::Unexpected {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        source,
    }
}

/// Whether the link text `existing` names `target` exactly. Only the
/// `\\?\` prefix Windows adds to extended-length paths is ignored; a
/// trailing separator or any other spelling difference is a mismatch.
fn same_target(existing: &Path, target: &Path) -> bool {
    strip_verbatim(existing) == strip_verbatim(target)
}

#[cfg(windows)]
fn strip_verbatim(p: &Path) -> &OsStr {
    p.to_str()
        .and_then(|s| s.strip_prefix(r"\\?\"))
        .map_or_else(|| p.as_os_str(), OsStr::new)
}

#[cfg(not(windows))]
fn strip_verbatim(p: &Path) -> &OsStr {
    p.as_os_str()
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
    use crate::error::ReconcileErrorKind;
    use crate::logging::test_helpers::CaptureLog;
    use crate::operations::MockFileSystemOps;
    use chrono::NaiveDate;
    use mockall::Sequence;

    fn fixed_clock() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .expect("valid timestamp")
    }

    const FIXED_STAMP: &str = "2025-01-02_03:04:05";

    fn occupied() -> io::Error {
        io::Error::from(io::ErrorKind::AlreadyExists)
    }

    fn denied() -> io::Error {
        io::Error::from(io::ErrorKind::PermissionDenied)
    }

    #[test]
    fn backup_path_appends_timestamp() {
        let path = backup_path_for(Path::new("/home/user/.bashrc"), FIXED_STAMP);
        assert_eq!(
            path,
            PathBuf::from("/home/user/.bashrc.backup.2025-01-02_03:04:05")
        );
    }

    #[test]
    fn backup_timestamp_has_no_spaces() {
        let stamp = fixed_clock().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        assert_eq!(stamp, FIXED_STAMP);
        assert!(!stamp.contains(' '));
    }

    #[cfg(windows)]
    #[test]
    fn verbatim_prefix_is_ignored() {
        let a = PathBuf::from(r"\\?\C:\dotfiles\data\home\.bashrc");
        let b = PathBuf::from(r"C:\dotfiles\data\home\.bashrc");
        assert!(same_target(&a, &b));
        assert!(!same_target(&a, Path::new(r"C:\dotfiles\data\home\.zshrc")));
    }

    #[cfg(not(windows))]
    #[test]
    fn verbatim_prefix_is_significant_off_windows() {
        let a = PathBuf::from(r"\\?\/data/home/.bashrc");
        assert!(!same_target(&a, Path::new("/data/home/.bashrc")));
    }

    #[test]
    fn trailing_separator_is_a_different_target() {
        assert!(!same_target(
            Path::new("/data/home/.bashrc/"),
            Path::new("/data/home/.bashrc")
        ));
        assert!(!same_target(
            Path::new("/data/home/./.bashrc"),
            Path::new("/data/home/.bashrc")
        ));
        assert!(same_target(
            Path::new("/data/home/.bashrc"),
            Path::new("/data/home/.bashrc")
        ));
    }

    // -----------------------------------------------------------------------
    // Real filesystem
    // -----------------------------------------------------------------------

    #[cfg(unix)]
    mod real_fs {
        use super::*;
        use crate::operations::SystemFileSystemOps;

        fn reconcile(target: &Path, link: &Path) -> Result<Reconciled, ReconcileError> {
            let log = CaptureLog::default();
            Reconciler::new(&SystemFileSystemOps, &log)
                .with_clock(fixed_clock)
                .reconcile(target, link)
        }

        #[test]
        fn creates_link_when_path_is_free() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("data/home/.bashrc");
            std::fs::create_dir_all(target.parent().unwrap()).unwrap();
            std::fs::write(&target, "new config").unwrap();
            let link = tmp.path().join(".bashrc");

            assert_eq!(reconcile(&target, &link).unwrap(), Reconciled::Created);
            assert_eq!(std::fs::read_link(&link).unwrap(), target);
        }

        #[test]
        fn dangling_target_is_allowed() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("not-there");
            let link = tmp.path().join("link");

            assert_eq!(reconcile(&target, &link).unwrap(), Reconciled::Created);
            assert_eq!(std::fs::read_link(&link).unwrap(), target);
        }

        #[test]
        fn second_run_is_a_no_op() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("target");
            std::fs::write(&target, "x").unwrap();
            let link = tmp.path().join("link");

            assert_eq!(reconcile(&target, &link).unwrap(), Reconciled::Created);
            assert_eq!(
                reconcile(&target, &link).unwrap(),
                Reconciled::AlreadyCorrect
            );
            assert_eq!(std::fs::read_link(&link).unwrap(), target);
            let entries = std::fs::read_dir(tmp.path()).unwrap().count();
            assert_eq!(entries, 2, "no backup should have been created");
        }

        #[test]
        fn regular_file_is_backed_up() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("target");
            std::fs::write(&target, "new config").unwrap();
            let link = tmp.path().join(".bashrc");
            std::fs::write(&link, "old config").unwrap();

            let outcome = reconcile(&target, &link).unwrap();
            let expected_backup = tmp
                .path()
                .join(format!(".bashrc.backup.{FIXED_STAMP}"));
            assert_eq!(
                outcome,
                Reconciled::BackedUp {
                    backup: expected_backup.clone()
                }
            );
            assert_eq!(
                std::fs::read_to_string(&expected_backup).unwrap(),
                "old config"
            );
            assert_eq!(std::fs::read_link(&link).unwrap(), target);
        }

        #[test]
        fn directory_is_backed_up_whole() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("nvim-src");
            std::fs::create_dir(&target).unwrap();
            let link = tmp.path().join("nvim");
            std::fs::create_dir(&link).unwrap();
            std::fs::write(link.join("init.lua"), "-- mine").unwrap();

            let Reconciled::BackedUp { backup } = reconcile(&target, &link).unwrap() else {
                panic!("expected a backup");
            };
            assert_eq!(
                std::fs::read_to_string(backup.join("init.lua")).unwrap(),
                "-- mine"
            );
            assert_eq!(std::fs::read_link(&link).unwrap(), target);
        }

        #[test]
        fn wrong_symlink_is_refused_and_left_alone() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("target");
            let other = tmp.path().join("other");
            std::fs::write(&target, "t").unwrap();
            std::fs::write(&other, "o").unwrap();
            let link = tmp.path().join("link");
            std::os::unix::fs::symlink(&other, &link).unwrap();

            let err = reconcile(&target, &link).unwrap_err();
            assert_eq!(err.kind(), ReconcileErrorKind::SymlinkConflict);
            assert_eq!(std::fs::read_link(&link).unwrap(), other);
            assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 3);
        }

        #[test]
        fn dangling_wrong_symlink_is_refused() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("target");
            let link = tmp.path().join("link");
            std::os::unix::fs::symlink(tmp.path().join("gone"), &link).unwrap();

            let err = reconcile(&target, &link).unwrap_err();
            assert!(matches!(err, ReconcileError::SymlinkConflict { .. }));
        }

        #[test]
        fn link_with_trailing_slash_is_refused() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("target");
            std::fs::write(&target, "t").unwrap();
            let link = tmp.path().join("link");
            let stored = format!("{}/", target.display());
            std::os::unix::fs::symlink(&stored, &link).unwrap();

            let err = reconcile(&target, &link).unwrap_err();
            let ReconcileError::SymlinkConflict { existing, .. } = err else {
                panic!("expected SymlinkConflict, got {err:?}");
            };
            assert_eq!(existing, PathBuf::from(&stored));
            assert_eq!(std::fs::read_link(&link).unwrap(), PathBuf::from(stored));
        }

        #[test]
        fn colliding_backup_name_gets_a_counter() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("target");
            let link = tmp.path().join(".bashrc");
            std::fs::write(&link, "second").unwrap();
            let taken = tmp.path().join(format!(".bashrc.backup.{FIXED_STAMP}"));
            std::fs::write(&taken, "first").unwrap();

            let outcome = reconcile(&target, &link).unwrap();
            let expected = tmp.path().join(format!(".bashrc.backup.{FIXED_STAMP}.1"));
            assert_eq!(
                outcome,
                Reconciled::BackedUp {
                    backup: expected.clone()
                }
            );
            assert_eq!(std::fs::read_to_string(&taken).unwrap(), "first");
            assert_eq!(std::fs::read_to_string(&expected).unwrap(), "second");
        }

        #[test]
        fn missing_parent_directory_is_unexpected() {
            let tmp = tempfile::tempdir().unwrap();
            let target = tmp.path().join("target");
            let link = tmp.path().join("no/such/dir/link");

            let err = reconcile(&target, &link).unwrap_err();
            assert_eq!(err.kind(), ReconcileErrorKind::Unexpected);
            assert!(err.to_string().contains("no/such/dir/link"));
        }
    }

    // -----------------------------------------------------------------------
    // Fault injection
    // -----------------------------------------------------------------------

    fn run(fs: &MockFileSystemOps) -> (Result<Reconciled, ReconcileError>, CaptureLog) {
        let log = CaptureLog::default();
        let result = Reconciler::new(fs, &log)
            .with_clock(fixed_clock)
            .reconcile(Path::new("/data/home/.bashrc"), Path::new("/home/user/.bashrc"));
        (result, log)
    }

    #[test]
    fn correct_symlink_performs_no_mutation() {
        let mut fs = MockFileSystemOps::new();
        fs.expect_symlink().times(1).returning(|_, _| Err(occupied()));
        fs.expect_is_symlink().times(1).returning(|_| Ok(true));
        fs.expect_read_link()
            .times(1)
            .returning(|_| Ok(PathBuf::from("/data/home/.bashrc")));
        fs.expect_rename().never();

        let (result, log) = run(&fs);
        assert_eq!(result.unwrap(), Reconciled::AlreadyCorrect);
        assert!(log.contains("already points to"));
    }

    #[test]
    fn near_miss_symlink_is_a_conflict() {
        let mut fs = MockFileSystemOps::new();
        fs.expect_symlink().times(1).returning(|_, _| Err(occupied()));
        fs.expect_is_symlink().times(1).returning(|_| Ok(true));
        fs.expect_read_link()
            .times(1)
            .returning(|_| Ok(PathBuf::from("/data/home/.bashrc/")));
        fs.expect_rename().never();

        let (result, _) = run(&fs);
        assert_eq!(
            result.unwrap_err().kind(),
            ReconcileErrorKind::SymlinkConflict
        );
    }

    #[test]
    fn create_failure_other_than_occupied_is_unexpected() {
        let mut fs = MockFileSystemOps::new();
        fs.expect_symlink().times(1).returning(|_, _| Err(denied()));
        fs.expect_is_symlink().never();
        fs.expect_rename().never();

        let (result, _) = run(&fs);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ReconcileErrorKind::Unexpected);
        let ReconcileError::Unexpected { source, link, target } = err else {
            panic!("expected Unexpected");
        };
        assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(link, PathBuf::from("/home/user/.bashrc"));
        assert_eq!(target, PathBuf::from("/data/home/.bashrc"));
    }

    #[test]
    fn inspection_failure_is_unexpected() {
        let mut fs = MockFileSystemOps::new();
        fs.expect_symlink().times(1).returning(|_, _| Err(occupied()));
        fs.expect_is_symlink().times(1).returning(|_| Err(denied()));
        fs.expect_rename().never();

        let (result, _) = run(&fs);
        assert_eq!(result.unwrap_err().kind(), ReconcileErrorKind::Unexpected);
    }

    #[test]
    fn read_link_failure_is_unexpected() {
        let mut fs = MockFileSystemOps::new();
        fs.expect_symlink().times(1).returning(|_, _| Err(occupied()));
        fs.expect_is_symlink().times(1).returning(|_| Ok(true));
        fs.expect_read_link().times(1).returning(|_| Err(denied()));
        fs.expect_rename().never();

        let (result, _) = run(&fs);
        assert_eq!(result.unwrap_err().kind(), ReconcileErrorKind::Unexpected);
    }

    #[test]
    fn backup_rename_failure_is_propagated_without_retry() {
        let mut fs = MockFileSystemOps::new();
        fs.expect_symlink().times(1).returning(|_, _| Err(occupied()));
        fs.expect_is_symlink().times(1).returning(|_| Ok(false));
        fs.expect_exists_no_follow().returning(|_| false);
        fs.expect_rename().times(1).returning(|_, _| Err(denied()));

        let (result, _) = run(&fs);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ReconcileErrorKind::Rename);
        let ReconcileError::Backup { backup, source, .. } = err else {
            panic!("expected Backup");
        };
        assert_eq!(
            backup,
            PathBuf::from(format!("/home/user/.bashrc.backup.{FIXED_STAMP}"))
        );
        assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn failed_retry_restores_the_backup() {
        let mut seq = Sequence::new();
        let mut fs = MockFileSystemOps::new();
        fs.expect_exists_no_follow().returning(|_| false);
        fs.expect_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(occupied()));
        fs.expect_is_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        fs.expect_rename()
            .withf(|from, _| from.ends_with(".bashrc"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        fs.expect_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(denied()));
        fs.expect_rename()
            .withf(|_, to| to.ends_with(".bashrc"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let (result, log) = run(&fs);
        let err = result.unwrap_err();
        let ReconcileError::Unexpected { source, .. } = err else {
            panic!("expected the retry's error, got {err:?}");
        };
        assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        assert!(log.contains("restored /home/user/.bashrc"));
    }

    #[test]
    fn failed_restore_reports_both_errors() {
        let mut seq = Sequence::new();
        let mut fs = MockFileSystemOps::new();
        fs.expect_exists_no_follow().returning(|_| false);
        fs.expect_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(occupied()));
        fs.expect_is_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        fs.expect_rename()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        fs.expect_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(denied()));
        fs.expect_rename()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(io::Error::other("disk gone")));

        let (result, _) = run(&fs);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ReconcileErrorKind::Unexpected);
        let ReconcileError::RestoreFailed {
            backup,
            retry,
            restore,
            ..
        } = err
        else {
            panic!("expected RestoreFailed");
        };
        assert_eq!(
            backup,
            PathBuf::from(format!("/home/user/.bashrc.backup.{FIXED_STAMP}"))
        );
        assert_eq!(retry.kind(), ReconcileErrorKind::Unexpected);
        assert_eq!(restore.to_string(), "disk gone");
    }

    #[test]
    fn retry_is_attempted_only_once() {
        let mut fs = MockFileSystemOps::new();
        fs.expect_exists_no_follow().returning(|_| false);
        // The path is re-occupied by a regular file between backup and retry.
        fs.expect_symlink().times(2).returning(|_, _| Err(occupied()));
        fs.expect_is_symlink().times(2).returning(|_| Ok(false));
        // The restore renames the backup straight onto the newcomer.
        let mut seq = Sequence::new();
        fs.expect_rename()
            .withf(|from, _| from.ends_with(".bashrc"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        fs.expect_rename()
            .withf(|_, to| to.ends_with(".bashrc"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let (result, _) = run(&fs);
        assert_eq!(result.unwrap_err().kind(), ReconcileErrorKind::AlreadyExists);
    }

    #[test]
    fn successful_backup_is_logged() {
        let mut fs = MockFileSystemOps::new();
        fs.expect_exists_no_follow().returning(|_| false);
        let mut seq = Sequence::new();
        fs.expect_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(occupied()));
        fs.expect_is_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(false));
        fs.expect_rename()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        fs.expect_symlink()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let (result, log) = run(&fs);
        assert!(matches!(result.unwrap(), Reconciled::BackedUp { .. }));
        assert!(log.contains("backed up /home/user/.bashrc"));
        assert!(log.contains("created symlink /home/user/.bashrc -> /data/home/.bashrc"));
    }
}
