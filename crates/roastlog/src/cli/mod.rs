//! Command-line interface for roastlog.

mod commands;
pub mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, LogCommand, RoastCommand, SessionCommand, SessionStartArgs, StatusCommand,
    TemplateCommand,
};

use crate::logging::Verbosity;

/// roastlog - Log home coffee roasts
///
/// Keep bean templates, prepare a roast, record phases and temperatures
/// against a running clock, and review saved roasts.
#[derive(Debug, Parser)]
#[command(name = "roastlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage bean templates
    #[command(subcommand)]
    Template(TemplateCommand),

    /// Prepare or inspect the pending roast session
    #[command(subcommand)]
    Session(SessionCommand),

    /// Run the live roast console for the pending session
    Roast(RoastCommand),

    /// Review saved roasts
    #[command(subcommand)]
    Log(LogCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}
