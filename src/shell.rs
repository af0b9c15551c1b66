//! Shell detection, rc file hook installation, and the `hook` script.
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ShellError;

/// Prefix that marks an rc file as already hooked, whatever shell argument
/// follows it.
pub const HOOK_MARKER: &str = "eval \"$(dotfiles hook";

/// Shells with hook support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Shell {
    /// Z shell.
    Zsh,
    /// GNU Bash.
    Bash,
}

impl Shell {
    /// Detect the shell from the value of `$SHELL`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Undetected`] if `shell_var` is empty or absent,
    /// and [`ShellError::Unsupported`] if it names neither zsh nor bash.
    pub fn detect(shell_var: Option<&str>) -> Result<Self, ShellError> {
        let path = shell_var
            .filter(|s| !s.is_empty())
            .ok_or(ShellError::Undetected)?;
        if path.contains("zsh") {
            Ok(Self::Zsh)
        } else if path.contains("bash") {
            Ok(Self::Bash)
        } else {
            Err(ShellError::Unsupported(path.to_string()))
        }
    }

    /// Lower-case shell name as accepted by `--shell`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zsh => "zsh",
            Self::Bash => "bash",
        }
    }

    /// rc file names under `$HOME`, in order of preference. The first entry
    /// is used when none exist yet.
    #[must_use]
    pub const fn rc_candidates(self) -> &'static [&'static str] {
        match self {
            Self::Zsh => &[".zshrc"],
            Self::Bash => &[".bashrc", ".bash_profile", ".profile"],
        }
    }

    /// The rc file to edit: the first candidate that exists, or the
    /// preferred one.
    #[must_use]
    pub fn rc_file(self, home: &Path) -> PathBuf {
        let candidates = self.rc_candidates();
        candidates
            .iter()
            .map(|name| home.join(name))
            .find(|path| path.exists())
            .unwrap_or_else(|| home.join(candidates.first().copied().unwrap_or(".profile")))
    }

    /// The line prepended to the rc file.
    #[must_use]
    pub fn hook_line(self) -> String {
        format!("eval \"$(dotfiles hook --shell {self})\"")
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What [`install_hook`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// The hook line was prepended.
    Installed,
    /// The rc file already contained a hook line.
    AlreadyPresent,
}

/// Returns `true` if `contents` already carries a hook line.
#[must_use]
pub fn has_hook(contents: &str) -> bool {
    contents.contains(HOOK_MARKER)
}

/// Read an rc file, treating a missing file as empty.
///
/// # Errors
///
/// Returns [`ShellError::Io`] for any read failure other than not-found.
pub fn read_rc(path: &Path) -> Result<String, ShellError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(ShellError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Prepend the hook line for `shell` to `rc`, unless one is already there.
///
/// Existing content is kept below the hook, separated by a blank line.
///
/// # Errors
///
/// Returns [`ShellError::Io`] if the rc file cannot be read or written.
pub fn install_hook(rc: &Path, shell: Shell) -> Result<HookOutcome, ShellError> {
    let existing = read_rc(rc)?;
    if has_hook(&existing) {
        return Ok(HookOutcome::AlreadyPresent);
    }

    let hook = shell.hook_line();
    let contents = if existing.is_empty() {
        format!("{hook}\n")
    } else {
        format!("{hook}\n\n{existing}")
    };
    std::fs::write(rc, contents).map_err(|source| ShellError::Io {
        path: rc.to_path_buf(),
        source,
    })?;
    Ok(HookOutcome::Installed)
}

/// Shell code printed by `dotfiles hook`: exports the dotfiles root and
/// sources the repository's hook script.
#[must_use]
pub fn hook_script(root: &Path) -> String {
    format!(
        "export DOTFILES_DIR=\"{}\"\nsource \"$DOTFILES_DIR/shell/hook.sh\"\n",
        root.display()
    )
}
