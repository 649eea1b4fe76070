//! CLI command dispatch and execution

use anyhow::Result;
use clap::{Parser, Subcommand};

mod config_cmd;
mod list;
mod resolve;

/// ael - apply AEL run configurations
#[derive(Parser, Debug)]
#[command(
    name = "ael",
    version,
    about = "Apply AEL run configurations",
    long_about = "Resolves run configurations into remote engine variables and zookeeper discovery settings"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a run configuration and print the resulting variables
    Resolve(resolve::ResolveArgs),

    /// List configured run configurations
    List(list::ListArgs),

    /// Show effective configuration
    Config(config_cmd::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Resolve(args) => resolve::execute(args),
            Commands::List(args) => list::execute(args),
            Commands::Config(args) => config_cmd::execute(args),
        }
    }
}
