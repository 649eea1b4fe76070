//! Tool configuration resolution
//!
//! Resolves configuration from multiple sources with priority:
//! 1. Command-line flags (passed as parameters)
//! 2. Environment variables
//! 3. Repo-local config (.ael.toml)
//! 4. Global config (~/.config/ael/config.toml)
//! 5. Defaults

mod discovery;
mod types;

pub use discovery::{
    ConfigError, ConfigOverrides, ConfigSources, REPO_CONFIG_FILE, config_sources, resolve_config,
};
pub use types::{AdminConfig, CapabilitiesConfig, Config};

impl Config {
    /// Like [`Config::run_configuration`], as an error when missing
    pub fn require_run_configuration(
        &self,
        name: &str,
    ) -> Result<&crate::run_config::RunConfiguration, ConfigError> {
        self.run_configuration(name)
            .ok_or_else(|| ConfigError::UnknownRunConfiguration(name.to_string()))
    }
}
