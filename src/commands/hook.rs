//! Command: print the shell code evaluated from the user's rc file.
//!
//! Output goes to stdout and is `eval`ed by the shell, so nothing else may
//! be written there.
use anyhow::Result;

use crate::cli::{GlobalOpts, HookOpts};
use crate::config::Config;
use crate::shell;

/// Run the hook command. The script is the same for every supported shell;
/// `--shell` only restricts which shells are accepted.
///
/// # Errors
///
/// Returns an error if the dotfiles root cannot be resolved.
pub fn run(global: &GlobalOpts, _opts: &HookOpts) -> Result<()> {
    let config = Config::load(global.root.as_deref())?;
    print!("{}", shell::hook_script(&config.root));
    Ok(())
}
