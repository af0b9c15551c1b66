//! `dotfiles` command-line entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use dotlink::cli::{Cli, Command};
use dotlink::commands;
use dotlink::logging::{self, Logger};

/// Install the console and file subscriber and create the task logger.
fn start_logging(verbose: bool, command: &Command) -> Arc<Logger> {
    let name = command.log_name();
    logging::init_subscriber(verbose, name);
    Arc::new(Logger::new(name))
}

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    // `hook` and `completions` print scripts the shell evaluates, so they
    // run without console logging.
    match &args.command {
        Command::Install(opts) => {
            let log = start_logging(args.verbose, &args.command);
            commands::install::run(&args.global, opts, &log)
        }
        Command::Tools(cmd) => {
            let log = start_logging(args.verbose, &args.command);
            commands::tools::run(&args.global, *cmd, &log)
        }
        Command::Hook(opts) => commands::hook::run(&args.global, opts),
        Command::Completions(opts) => {
            commands::completions::run(opts.shell);
            Ok(())
        }
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
