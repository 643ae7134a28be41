//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::skip_state::SkipSet;

/// Top-level CLI entry point for the workstation provisioner.
#[derive(Parser, Debug)]
#[command(
    name = "devsetup",
    about = "Provision a developer workstation in idempotent, numbered steps",
    version
)]
pub struct Cli {
    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The subcommand to execute.
    #[must_use]
    pub fn action(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Configuration file (default: $XDG_CONFIG_HOME/devsetup/devsetup.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Steps to skip, e.g. "2,5"; bypasses the skip prompts
    #[arg(long, global = true, value_parser = SkipSet::parse)]
    pub skip: Option<SkipSet>,

    /// Saved skip list location (default: $XDG_CONFIG_HOME/devsetup/skip_steps)
    #[arg(long, global = true)]
    pub skip_file: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the provisioning steps, then verify
    Run,
    /// Only run the verification checks
    Verify,
    /// List the numbered steps
    Steps,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Verify => "verify",
            Self::Steps => "steps",
            Self::Version => "version",
        }
    }
}
