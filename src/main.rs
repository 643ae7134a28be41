//! `devsetup` command-line entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use devsetup_cli::cli::{Cli, Command};
use devsetup_cli::commands;
use devsetup_cli::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let command = args.action();
    init_subscriber(args.verbose, command.name());
    let log = Arc::new(Logger::new(command.name()));

    match command {
        Command::Run => commands::run::run(&args.global, &log),
        Command::Verify => commands::verify::run(&args.global, &log),
        Command::Steps => commands::steps::run(&args.global, &log),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
