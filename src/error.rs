//! Domain-specific error types for the link engine.
//!
//! Library code returns these typed errors; command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ReconcileError            — one (target, link) reconciliation
//! ├── AlreadyExists         — a non-symlink occupies the link path
//! ├── SymlinkConflict       — a symlink to somewhere else occupies it
//! ├── Unexpected            — any other I/O failure
//! ├── RestoreFailed         — retry failed and the backup could not be put back
//! └── Backup                — renaming the occupant aside failed
//! ConfigError               — root resolution and dotfiles.toml
//! ShellError                — shell detection and rc file editing
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`ReconcileError`].
///
/// Callers branch on the kind rather than on individual variants; the
/// composite [`ReconcileError::RestoreFailed`] is deliberately reported as
/// [`ReconcileErrorKind::Unexpected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileErrorKind {
    /// A non-symlink occupies the link path; recoverable by backup and retry.
    AlreadyExists,
    /// A symlink to a different target occupies the link path.
    SymlinkConflict,
    /// Any other failure, including a failed restore after a failed retry.
    Unexpected,
    /// Moving the occupant to its backup path failed; nothing was changed.
    Rename,
}

/// Errors raised while reconciling a single link.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// A regular file, directory or other non-symlink occupies `link`.
    #[error("file already exists: {}", .link.display())]
    AlreadyExists {
        /// The occupied link path.
        link: PathBuf,
    },

    /// `link` is already a symlink, but it points at `existing` rather than
    /// `target`. Never resolved automatically.
    #[error(
        "symlink already exists: {} -> {} (wanted {})",
        .link.display(),
        .existing.display(),
        .target.display()
    )]
    SymlinkConflict {
        /// The occupied link path.
        link: PathBuf,
        /// Where the existing symlink currently points.
        existing: PathBuf,
        /// Where the link was supposed to point.
        target: PathBuf,
    },

    /// Creating or inspecting the link failed for a reason other than the
    /// path being occupied.
    #[error(
        "unexpected error while creating symlink for {} -> {}: {source}",
        .link.display(),
        .target.display()
    )]
    Unexpected {
        /// The link path being reconciled.
        link: PathBuf,
        /// The desired symlink target.
        target: PathBuf,
        /// The underlying filesystem error.
        source: io::Error,
    },

    /// The retry after a backup failed, and moving the backup back to `link`
    /// failed too. The original file now only exists at `backup`.
    #[error(
        "unexpected error while creating symlink for {} -> {}: retry failed ({retry}) and restoring {} failed ({restore})",
        .link.display(),
        .target.display(),
        .backup.display()
    )]
    RestoreFailed {
        /// The link path being reconciled.
        link: PathBuf,
        /// The desired symlink target.
        target: PathBuf,
        /// Where the original occupant was moved to.
        backup: PathBuf,
        /// Why the retried symlink creation failed.
        retry: Box<Self>,
        /// Why moving the backup back failed.
        restore: io::Error,
    },

    /// Renaming the occupant of `link` to `backup` failed.
    #[error("backing up {} to {}: {source}", .link.display(), .backup.display())]
    Backup {
        /// The occupied link path.
        link: PathBuf,
        /// The backup path that could not be created.
        backup: PathBuf,
        /// The rename error, unchanged.
        source: io::Error,
    },
}

impl ReconcileError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ReconcileErrorKind {
        match self {
            Self::AlreadyExists { .. } => ReconcileErrorKind::AlreadyExists,
            Self::SymlinkConflict { .. } => ReconcileErrorKind::SymlinkConflict,
            Self::Unexpected { .. } | Self::RestoreFailed { .. } => ReconcileErrorKind::Unexpected,
            Self::Backup { .. } => ReconcileErrorKind::Rename,
        }
    }

    /// The link path this error refers to.
    #[must_use]
    pub const fn link(&self) -> &PathBuf {
        match self {
            Self::AlreadyExists { link }
            | Self::SymlinkConflict { link, .. }
            | Self::Unexpected { link, .. }
            | Self::RestoreFailed { link, .. }
            | Self::Backup { link, .. } => link,
        }
    }
}

/// Errors that arise while resolving paths and loading `dotfiles.toml`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    /// The dotfiles source directory does not exist.
    #[error("dotfiles directory not found at {}; clone the repository first", .0.display())]
    MissingRoot(PathBuf),

    /// `dotfiles.toml` could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// `dotfiles.toml` is not valid TOML or has unknown keys.
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

/// Errors that arise from shell detection and hook installation.
#[derive(Error, Debug)]
pub enum ShellError {
    /// `$SHELL` names a shell without hook support.
    #[error("unsupported shell: {0}")]
    Unsupported(String),

    /// `$SHELL` is unset.
    #[error("SHELL environment variable is not set")]
    Undetected,

    /// Reading or writing the rc file failed.
    #[error("updating {}: {source}", .path.display())]
    Io {
        /// The rc file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn io_err(kind: io::ErrorKind) -> io::Error {
        io::Error::new(kind, "boom")
    }

    #[test]
    fn already_exists_display() {
        let e = ReconcileError::AlreadyExists {
            link: PathBuf::from("/home/user/.bashrc"),
        };
        assert_eq!(e.to_string(), "file already exists: /home/user/.bashrc");
        assert_eq!(e.kind(), ReconcileErrorKind::AlreadyExists);
    }

    #[test]
    fn symlink_conflict_display_names_both_targets() {
        let e = ReconcileError::SymlinkConflict {
            link: PathBuf::from("/home/user/.bashrc"),
            existing: PathBuf::from("/elsewhere/bashrc"),
            target: PathBuf::from("/data/home/.bashrc"),
        };
        let msg = e.to_string();
        assert!(msg.contains("symlink already exists"));
        assert!(msg.contains("/elsewhere/bashrc"));
        assert!(msg.contains("/data/home/.bashrc"));
        assert_eq!(e.kind(), ReconcileErrorKind::SymlinkConflict);
    }

    #[test]
    fn unexpected_keeps_source() {
        use std::error::Error as StdError;
        let e = ReconcileError::Unexpected {
            link: PathBuf::from("/l"),
            target: PathBuf::from("/t"),
            source: io_err(io::ErrorKind::PermissionDenied),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/l -> /t"));
        assert_eq!(e.kind(), ReconcileErrorKind::Unexpected);
    }

    #[test]
    fn restore_failed_is_unexpected_and_mentions_both_causes() {
        let e = ReconcileError::RestoreFailed {
            link: PathBuf::from("/l"),
            target: PathBuf::from("/t"),
            backup: PathBuf::from("/l.backup.2025-01-01_00:00:00"),
            retry: Box::new(ReconcileError::Unexpected {
                link: PathBuf::from("/l"),
                target: PathBuf::from("/t"),
                source: io::Error::other("retry-cause"),
            }),
            restore: io::Error::other("restore-cause"),
        };
        let msg = e.to_string();
        assert!(msg.contains("retry-cause"));
        assert!(msg.contains("restore-cause"));
        assert!(msg.contains("/l.backup.2025-01-01_00:00:00"));
        assert_eq!(e.kind(), ReconcileErrorKind::Unexpected);
    }

    #[test]
    fn backup_is_rename_kind() {
        let e = ReconcileError::Backup {
            link: PathBuf::from("/l"),
            backup: PathBuf::from("/l.backup.x"),
            source: io_err(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(e.kind(), ReconcileErrorKind::Rename);
        assert_eq!(e.link(), &PathBuf::from("/l"));
    }

    #[test]
    fn config_error_missing_root_display() {
        let e = ConfigError::MissingRoot(PathBuf::from("/home/u/.config/dotfiles/data/home"));
        assert!(e.to_string().contains("clone the repository first"));
    }

    #[test]
    fn shell_error_unsupported_display() {
        let e = ShellError::Unsupported("/usr/bin/fish".to_string());
        assert_eq!(e.to_string(), "unsupported shell: /usr/bin/fish");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ReconcileError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<ShellError>();
    }

    #[test]
    fn reconcile_error_converts_to_anyhow() {
        let e = ReconcileError::AlreadyExists {
            link: PathBuf::from("/x"),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
