//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::account::AccountCommand;
use crate::commands::event::EventCommand;

/// Command-line client for the Wudder notarization service.
#[derive(Parser, Debug)]
#[command(name = "wudder")]
#[command(author, version = env!("WUDDER_VERSION"), about, long_about = None)]
pub struct Cli {
    /// GraphQL endpoint (defaults to the stored session's, then the public service)
    #[arg(long, env = "WUDDER_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Account and session operations
    Account(AccountCommand),

    /// Event submission and lookup
    Event(EventCommand),
}
