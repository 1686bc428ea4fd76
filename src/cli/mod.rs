pub mod commands;
pub mod context;
pub mod logging;
pub mod output;

use clap::{Parser, Subcommand};

use logging::Verbosity;

/// Ship Notion organization audit logs to Microsoft Sentinel.
#[derive(Parser, Debug)]
#[command(name = "notion2sen", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// YAML configuration file (default: config.yml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode: only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity {
            verbose: self.verbose,
            quiet: self.quiet,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch audit logs within the lookback window and ship them (default)
    Run {
        /// Print flattened records to stdout instead of shipping them
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the configuration without contacting any service
    Check,

    /// Create or update the Sentinel table and its retention
    CreateTable,
}
