mod adapters;
mod cli;
mod config;
mod core;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    dotenvy::dotenv().ok();
    let args = Cli::parse();

    let config = args.config.as_deref();
    let verbosity = args.verbosity();

    let result = match &args.command {
        None => cli::commands::run::execute(config, false, verbosity),
        Some(Commands::Run { dry_run }) => cli::commands::run::execute(config, *dry_run, verbosity),
        Some(Commands::Check) => cli::commands::check::execute(config),
        Some(Commands::CreateTable) => cli::commands::create_table::execute(config, verbosity),
    };

    if let Err(e) = result {
        cli::output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
