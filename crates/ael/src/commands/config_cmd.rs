//! Config command implementation

use ael_config_core::capability::CapabilityRegistry;
use ael_config_core::config::{ConfigOverrides, config_sources, resolve_config};
use ael_config_core::home::{config_dir, get_home_dir};
use anyhow::Result;
use clap::Args;
use serde_json::json;

/// Show effective configuration
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;

    let overrides = ConfigOverrides::default();
    let config = resolve_config(&overrides, &current_dir, &home_dir)?;
    let sources = config_sources(&overrides, &current_dir, &home_dir);
    let admin_dir = config.admin_dir(&config_dir(&home_dir));
    // An id listed as both installed and available is reported once, as installed
    let capabilities = CapabilityRegistry::from_lists(
        config.capabilities.installed.iter().cloned(),
        config.capabilities.available.iter().cloned(),
    )
    .snapshot();

    let global_exists = sources.global.exists();
    let repo_path = sources.repo.as_ref().map(|p| p.display().to_string());

    if args.json {
        let output = json!({
            "adminDir": admin_dir.display().to_string(),
            "capabilities": capabilities,
            "variables": config.variables,
            "runConfigurations": config.run_configurations.len(),
            "configFiles": {
                "global": {
                    "path": sources.global.display().to_string(),
                    "exists": global_exists,
                },
                "repo": repo_path,
            }
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Configuration:");
        println!("  admin_dir: {}", admin_dir.display());
        if capabilities.is_empty() {
            println!("  capabilities: (none)");
        }
        for (id, state) in &capabilities {
            println!("  capability {id}: {}", state.as_str());
        }
        for (name, value) in &config.variables {
            println!("  variable {name}={value}");
        }
        println!("  run configurations: {}", config.run_configurations.len());
        println!();
        println!("Config files:");
        let global_display = sources.global.display();
        let global_status = if global_exists { "(found)" } else { "(not found)" };
        println!("  Global: {global_display} {global_status}");
        match repo_path {
            Some(path) => println!("  Repo: {path} (found)"),
            None => println!("  Repo: (none)"),
        }
    }

    Ok(())
}
