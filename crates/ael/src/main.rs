//! ael - apply AEL run configurations
//!
//! Resolves a named run configuration into the remote engine variables and,
//! for standalone deployments, the zookeeper discovery settings.

use ael_config_core::logging;
use clap::Parser;

mod commands;

use commands::Cli;

fn main() {
    logging::init();
    let cli = Cli::parse();

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
