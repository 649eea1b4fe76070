//! Resolve command implementation

use ael_config_core::capability::CapabilityRegistry;
use ael_config_core::config::{ConfigOverrides, resolve_config};
use ael_config_core::home::{config_dir, get_home_dir};
use ael_config_core::resolver::{
    ConfigurationResolver, DiscoveryOutcome, Resolution, RunConfigurationExecutor,
};
use ael_config_core::variables::{ENGINE_VARIABLES, VariableSink, VariableSpace};
use ael_config_core::FileConfigAdmin;
use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Apply a run configuration
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Run configuration name
    name: String,

    /// Set a variable before resolving (repeatable), e.g.
    /// --var KETTLE_AEL_PDI_DAEMON_VERSION=1.0
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    vars: Vec<(String, String)>,

    /// Configuration admin directory
    #[arg(long)]
    admin_dir: Option<PathBuf>,

    /// Config file to use instead of the repo-local .ael.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty variable name in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Execute the resolve command
pub fn execute(args: ResolveArgs) -> Result<()> {
    let home_dir = get_home_dir()?;
    let current_dir = std::env::current_dir()?;

    let overrides = ConfigOverrides {
        admin_dir: args.admin_dir.clone(),
        variables: args.vars.clone(),
        config_path: args.config.clone(),
    };
    let config = resolve_config(&overrides, &current_dir, &home_dir)?;
    let run = config.require_run_configuration(&args.name)?;

    let capabilities = Arc::new(CapabilityRegistry::from_lists(
        config.capabilities.installed.iter().cloned(),
        config.capabilities.available.iter().cloned(),
    ));
    let admin = Arc::new(FileConfigAdmin::new(
        config.admin_dir(&config_dir(&home_dir)),
    ));
    let resolver = ConfigurationResolver::new(capabilities, admin.clone());

    let mut variables = VariableSpace::from_env();
    for (name, value) in &config.variables {
        variables.set_variable(name, Some(value));
    }

    let resolution = resolver
        .execute(run, &mut variables)
        .with_context(|| format!("Failed to resolve run configuration '{}'", run.name))?;

    if let Some(e) = resolution.discovery.error() {
        warn!(
            admin_dir = %admin.dir().display(),
            error = %e,
            "Discovery configuration not updated"
        );
    }

    if args.json {
        let output = json!({
            "runConfiguration": run.name,
            "protocolVersion": resolution.protocol(),
            "daemonVersion": resolution.version.value,
            "mode": resolution.mode,
            "jaasInstallRequested": resolution.jaas_install_requested,
            "variables": engine_variables_json(&variables),
            "discovery": discovery_json(&resolution.discovery),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text(&run.name, &resolution, &variables);
    }

    Ok(())
}

fn engine_variables_json(variables: &VariableSpace) -> Value {
    let mut map = Map::new();
    for name in ENGINE_VARIABLES {
        if variables.contains(name) {
            let value = variables.get(name).map_or(Value::Null, |v| json!(v));
            map.insert(name.to_string(), value);
        }
    }
    Value::Object(map)
}

fn discovery_json(outcome: &DiscoveryOutcome) -> Value {
    match outcome {
        DiscoveryOutcome::Skipped => json!({ "status": "skipped" }),
        DiscoveryOutcome::NoProperties => json!({ "status": "no_properties" }),
        DiscoveryOutcome::Configured { host, port } => {
            json!({ "status": "configured", "host": host, "port": port })
        }
        DiscoveryOutcome::Cleaned { removed } => json!({ "status": "cleaned", "removed": removed }),
        DiscoveryOutcome::Failed(e) => json!({ "status": "failed", "error": e.to_string() }),
    }
}

fn print_text(run_name: &str, resolution: &Resolution, variables: &VariableSpace) {
    let protocol = resolution.protocol();
    let mode = resolution.mode;
    println!("Run configuration: {run_name}");
    println!("  daemon protocol: {protocol:?}");
    println!("  deployment: {mode:?}");
    if resolution.jaas_install_requested {
        println!("  requested install: pentaho-kerberos-jaas");
    }
    println!();
    println!("Variables:");
    for name in ENGINE_VARIABLES {
        if !variables.contains(name) {
            continue;
        }
        match variables.get(name) {
            Some(value) => println!("  {name}={value}"),
            None => println!("  {name} (cleared)"),
        }
    }
    println!();
    let discovery = match &resolution.discovery {
        DiscoveryOutcome::Skipped => "skipped (server mode)".to_string(),
        DiscoveryOutcome::NoProperties => "no discovery properties".to_string(),
        DiscoveryOutcome::Configured { host, port } => format!("zookeeper {host}:{port}"),
        DiscoveryOutcome::Cleaned { removed } => format!("removed {removed} zookeeper setting(s)"),
        DiscoveryOutcome::Failed(e) => format!("failed: {e}"),
    };
    println!("Discovery: {discovery}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("A=1").unwrap(),
            ("A".to_string(), "1".to_string())
        );
        assert_eq!(
            parse_key_value("A=b=c").unwrap(),
            ("A".to_string(), "b=c".to_string())
        );
        assert_eq!(parse_key_value("A=").unwrap(), ("A".to_string(), String::new()));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=1").is_err());
    }
}
