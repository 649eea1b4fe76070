//! Configuration types

use crate::run_config::RunConfiguration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Complete tool configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Configuration admin storage
    #[serde(default)]
    pub admin: AdminConfig,
    /// Platform capabilities known to this deployment
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
    /// Variables seeded into every resolution, e.g. the daemon version
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Named run configurations
    #[serde(default)]
    pub run_configurations: Vec<RunConfiguration>,
}

/// Configuration admin storage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Directory of `<pid>.toml` files (default: ~/.config/ael/admin)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Capabilities registered with the platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesConfig {
    /// Registered and installed
    #[serde(default)]
    pub installed: Vec<String>,
    /// Registered but not installed
    #[serde(default)]
    pub available: Vec<String>,
}

impl Config {
    /// Look up a run configuration by name
    pub fn run_configuration(&self, name: &str) -> Option<&RunConfiguration> {
        self.run_configurations.iter().find(|r| r.name == name)
    }

    /// Admin directory, falling back to `<config_dir>/admin`
    pub fn admin_dir(&self, config_dir: &Path) -> PathBuf {
        self.admin
            .dir
            .clone()
            .unwrap_or_else(|| config_dir.join("admin"))
    }
}
