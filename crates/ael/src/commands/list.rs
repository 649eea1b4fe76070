//! List command implementation

use ael_config_core::config::{ConfigOverrides, resolve_config};
use ael_config_core::home::get_home_dir;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// List run configurations
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Config file to use instead of the repo-local .ael.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the list command
pub fn execute(args: ListArgs) -> Result<()> {
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;

    let overrides = ConfigOverrides {
        config_path: args.config,
        ..Default::default()
    };
    let config = resolve_config(&overrides, &current_dir, &home_dir)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config.run_configurations)?);
        return Ok(());
    }

    if config.run_configurations.is_empty() {
        println!("No run configurations found");
        return Ok(());
    }

    for run in &config.run_configurations {
        let uri = run.endpoint_uri();
        let uri = if uri.is_empty() { "(default endpoint)" } else { uri.as_str() };
        match &run.description {
            Some(description) => println!("{}  {uri}  - {description}", run.name),
            None => println!("{}  {uri}", run.name),
        }
    }

    Ok(())
}
