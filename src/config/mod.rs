//! Path resolution and the optional `dotfiles.toml` settings file.
//!
//! The dotfiles root is resolved from, in order, the `--root` flag, the
//! `DOTFILES_ROOT` environment variable, and `$HOME/.config/dotfiles`.
//! Everything under `<root>/data/home` is linked into `$HOME`, except the
//! nested `.config` directory whose entries are linked into
//! `$HOME/.config` one by one.
pub mod toml_loader;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Name of the optional settings file at the dotfiles root.
pub const SETTINGS_FILE: &str = "dotfiles.toml";

/// Name of the nested directory that is linked entry-by-entry into the
/// user's configuration directory instead of as a whole.
pub const CONFIG_SUBDIR: &str = ".config";

/// `[home]` / `[config]` sections: entries to leave alone.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LinkSection {
    /// File names (not paths) inside the source directory to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// `[shell]` section.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ShellSection {
    /// Whether `install` prepends the hook line to the shell rc file.
    #[serde(default = "default_true")]
    pub hook: bool,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self { hook: true }
    }
}

/// `[tools]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ToolsSection {
    /// Tool names to manage. Empty means every known tool.
    #[serde(default)]
    pub enabled: Vec<String>,
}

/// Contents of `dotfiles.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Exclusions for the `$HOME` pass.
    #[serde(default)]
    pub home: LinkSection,
    /// Exclusions for the `$HOME/.config` pass.
    #[serde(default)]
    pub config: LinkSection,
    /// Shell hook settings.
    #[serde(default)]
    pub shell: ShellSection,
    /// Tool installation settings.
    #[serde(default)]
    pub tools: ToolsSection,
}

const fn default_true() -> bool {
    true
}

/// Resolved locations plus settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dotfiles repository root.
    pub root: PathBuf,
    /// The user's home directory.
    pub home: PathBuf,
    /// The user's configuration directory (`$HOME/.config`).
    pub config_dir: PathBuf,
    /// Parsed `dotfiles.toml`.
    pub settings: Settings,
}

impl Config {
    /// Resolve paths from the process environment and load settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset or `dotfiles.toml` is invalid.
    pub fn load(root_override: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(root_override, |key| std::env::var(key).ok())
    }

    /// Like [`load`](Self::load), reading environment variables through `env`.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset or `dotfiles.toml` is invalid.
    pub fn load_with_env(
        root_override: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let home = env("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingEnv("HOME"))?;
        let config_dir = home.join(".config");

        let root = root_override
            .map(Path::to_path_buf)
            .or_else(|| env("DOTFILES_ROOT").filter(|r| !r.is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| config_dir.join("dotfiles"));
        let root = absolutize(&root);

        let settings = toml_loader::load_config(&root.join(SETTINGS_FILE))?;

        Ok(Self {
            root,
            home,
            config_dir,
            settings,
        })
    }

    /// Directory whose entries are linked into `$HOME`.
    #[must_use]
    pub fn home_source_dir(&self) -> PathBuf {
        self.root.join("data").join("home")
    }

    /// Directory whose entries are linked into `$HOME/.config`.
    #[must_use]
    pub fn config_source_dir(&self) -> PathBuf {
        self.home_source_dir().join(CONFIG_SUBDIR)
    }

    /// Names skipped in the `$HOME` pass: `.config` plus configured exclusions.
    #[must_use]
    pub fn home_excludes(&self) -> Vec<String> {
        let mut excludes = vec![CONFIG_SUBDIR.to_string()];
        excludes.extend(self.settings.home.exclude.iter().cloned());
        excludes
    }

    /// Names skipped in the `$HOME/.config` pass.
    #[must_use]
    pub fn config_excludes(&self) -> Vec<String> {
        self.settings.config.exclude.clone()
    }

    /// Fail unless the `$HOME` source directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRoot`] naming the missing directory.
    pub fn ensure_source_dir(&self) -> Result<(), ConfigError> {
        let dir = self.home_source_dir();
        if dir.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::MissingRoot(dir))
        }
    }
}

/// Make `path` absolute so that symlinks created from it never dangle when
/// the user passed a relative `--root`.
fn absolutize(path: &Path) -> PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}
