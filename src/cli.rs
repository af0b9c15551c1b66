//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::shell::Shell;

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "dotfiles",
    about = "Link a dotfiles store into $HOME, backing up whatever was there",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by all subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override dotfiles root directory (default: $DOTFILES_ROOT or ~/.config/dotfiles)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Disable parallel linking (parallel is enabled by default)
    #[arg(long = "no-parallel", global = true, action = clap::ArgAction::SetFalse)]
    pub parallel: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Link dotfiles into place and configure the shell
    Install(InstallOpts),
    /// Print shell code that loads the dotfiles hook
    Hook(HookOpts),
    /// List or install command-line tools
    #[command(subcommand)]
    Tools(ToolsCommand),
    /// Print a shell completion script
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn log_name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Hook(_) => "hook",
            Self::Tools(_) => "tools",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip tasks whose name contains any of these words
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only tasks whose name contains any of these words
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Do not install command-line tools
    #[arg(long)]
    pub no_tools: bool,
}

/// Options for the `hook` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct HookOpts {
    /// Shell to emit code for
    #[arg(long, value_enum)]
    pub shell: Shell,
}

/// `tools` subcommands.
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ToolsCommand {
    /// Show which tools are installed
    List,
    /// Install missing tools
    Install,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
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
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_dry_run() {
        let cli = Cli::parse_from(["dotfiles", "--dry-run", "install"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_install_dry_run_short() {
        let cli = Cli::parse_from(["dotfiles", "install", "-d"]);
        assert!(cli.global.dry_run);
    }

    #[test]
    fn parse_install_skip_tasks() {
        let cli = Cli::parse_from(["dotfiles", "install", "--skip", "shell,tools"]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.skip, vec!["shell", "tools"]);
    }

    #[test]
    fn parse_install_only_tasks() {
        let cli = Cli::parse_from(["dotfiles", "install", "--only", "link"]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.only, vec!["link"]);
        assert!(!opts.no_tools);
    }

    #[test]
    fn parse_install_no_tools() {
        let cli = Cli::parse_from(["dotfiles", "install", "--no-tools"]);
        assert!(matches!(cli.command, Command::Install(InstallOpts { no_tools: true, .. })));
    }

    #[test]
    fn parse_hook_shell() {
        let cli = Cli::parse_from(["dotfiles", "hook", "--shell", "zsh"]);
        let Command::Hook(opts) = cli.command else {
            panic!("expected hook");
        };
        assert_eq!(opts.shell, Shell::Zsh);
    }

    #[test]
    fn hook_rejects_unknown_shell() {
        assert!(Cli::try_parse_from(["dotfiles", "hook", "--shell", "fish"]).is_err());
    }

    #[test]
    fn parse_tools_subcommands() {
        let cli = Cli::parse_from(["dotfiles", "tools", "list"]);
        assert!(matches!(cli.command, Command::Tools(ToolsCommand::List)));
        let cli = Cli::parse_from(["dotfiles", "tools", "install"]);
        assert!(matches!(cli.command, Command::Tools(ToolsCommand::Install)));
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["dotfiles", "completions", "fish"]);
        assert!(matches!(
            cli.command,
            Command::Completions(CompletionsOpts {
                shell: clap_complete::Shell::Fish
            })
        ));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dotfiles", "version"]);
        assert!(matches!(cli.command, Command::Version));
        assert_eq!(cli.command.log_name(), "version");
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["dotfiles", "-v", "install"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_root_override() {
        let cli = Cli::parse_from(["dotfiles", "--root", "/tmp/dotfiles", "install"]);
        assert_eq!(cli.global.root, Some(PathBuf::from("/tmp/dotfiles")));
    }

    #[test]
    fn parallel_is_enabled_by_default() {
        let cli = Cli::parse_from(["dotfiles", "install"]);
        assert!(cli.global.parallel, "parallel should be true by default");
    }

    #[test]
    fn no_parallel_disables_parallel() {
        let cli = Cli::parse_from(["dotfiles", "--no-parallel", "install"]);
        assert!(!cli.global.parallel);
    }
}
