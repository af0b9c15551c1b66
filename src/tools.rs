//! Command-line tools the dotfiles expect on `PATH`, and how to install them.
use std::fmt;

use anyhow::{Result, bail};

use crate::exec::Executor;
use crate::logging::Log;

/// Package manager used to install a [`Tool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Installer {
    /// `cargo install <package>`.
    Cargo,
    /// `brew install <package>`.
    Brew,
}

impl Installer {
    /// The installer's executable name.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Cargo => "cargo",
            Self::Brew => "brew",
        }
    }
}

impl fmt::Display for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// A tool identified by the binary it puts on `PATH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    /// Binary name checked on `PATH`.
    pub binary: &'static str,
    /// Package name passed to the installer.
    pub package: &'static str,
    /// How to install it.
    pub installer: Installer,
}

/// Every tool known to the installer, in install order.
pub const ALL_TOOLS: &[Tool] = &[
    Tool {
        binary: "eza",
        package: "eza",
        installer: Installer::Cargo,
    },
    Tool {
        binary: "rg",
        package: "ripgrep",
        installer: Installer::Cargo,
    },
    Tool {
        binary: "fd",
        package: "fd-find",
        installer: Installer::Cargo,
    },
    Tool {
        binary: "nvim",
        package: "nvim",
        installer: Installer::Brew,
    },
];

/// Tools to manage given the `[tools] enabled` setting. An empty list
/// selects everything; otherwise a tool matches by binary or package name.
#[must_use]
pub fn selected(enabled: &[String]) -> Vec<Tool> {
    ALL_TOOLS
        .iter()
        .filter(|tool| enabled.is_empty() || enabled.iter().any(|name| tool.answers_to(name)))
        .copied()
        .collect()
}

/// Names in `enabled` that match no known tool.
#[must_use]
pub fn unknown(enabled: &[String]) -> Vec<&str> {
    enabled
        .iter()
        .map(String::as_str)
        .filter(|name| !ALL_TOOLS.iter().any(|tool| tool.answers_to(name)))
        .collect()
}

/// Warn once per `[tools] enabled` entry that names no known tool.
pub fn warn_unknown(enabled: &[String], log: &dyn Log) {
    let names = unknown(enabled);
    if names.is_empty() {
        return;
    }
    let known: Vec<_> = ALL_TOOLS.iter().map(|t| t.binary).collect();
    for name in names {
        log.warn(&format!(
            "[tools] enabled: unknown tool '{name}' (known: {})",
            known.join(", ")
        ));
    }
}

impl Tool {
    fn answers_to(&self, name: &str) -> bool {
        name == self.binary || name == self.package
    }

    /// Returns `true` if the tool's binary is on `PATH`.
    #[must_use]
    pub fn is_installed(&self, exec: &dyn Executor) -> bool {
        exec.which(self.binary)
    }

    /// Install the tool with its package manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager is missing or the install
    /// command fails.
    pub fn install(&self, exec: &dyn Executor) -> Result<()> {
        let program = self.installer.program();
        if !exec.which(program) {
            bail!("{program} not found; install it first to get {}", self.binary);
        }
        exec.run(program, &["install", self.package])?;
        Ok(())
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.binary == self.package {
            write!(f, "{} ({})", self.binary, self.installer)
        } else {
            write!(f, "{} ({} {})", self.binary, self.installer, self.package)
        }
    }
}
