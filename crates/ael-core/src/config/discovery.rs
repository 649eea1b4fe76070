//! Configuration discovery and resolution

use super::types::Config;
use crate::home::config_dir;
use crate::variables::DAEMON_VERSION_VARIABLE;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Repo-local config file name
pub const REPO_CONFIG_FILE: &str = ".ael.toml";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// No run configuration with the requested name
    #[error("Unknown run configuration: {0}")]
    UnknownRunConfiguration(String),
}

/// Command-line overrides for configuration
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Override the admin directory
    pub admin_dir: Option<PathBuf>,
    /// Extra variables (`--var KEY=VALUE`), applied last
    pub variables: Vec<(String, String)>,
    /// Explicit config file; replaces repo-local discovery
    pub config_path: Option<PathBuf>,
}

/// Paths consulted while resolving, for display
#[derive(Debug, Clone)]
pub struct ConfigSources {
    pub global: PathBuf,
    pub repo: Option<PathBuf>,
}

/// Resolve configuration from all sources
///
/// Priority (highest to lowest):
/// 1. Command-line overrides
/// 2. Environment variables (`AEL_ADMIN_DIR`, `AEL_DAEMON_VERSION`)
/// 3. Repo-local config (.ael.toml in current dir, up to the git root)
/// 4. Global config (~/.config/ael/config.toml)
/// 5. Defaults
pub fn resolve_config(
    overrides: &ConfigOverrides,
    current_dir: &Path,
    home_dir: &Path,
) -> Result<Config, ConfigError> {
    let mut config = Config::default();
    let sources = config_sources(overrides, current_dir, home_dir);

    // 4. Global config
    if sources.global.exists() {
        match load_config_file(&sources.global) {
            Ok(file_config) => merge_config(&mut config, file_config),
            Err(e) => warn!("Failed to parse global config at {:?}: {e}", sources.global),
        }
    }

    // 3. Repo-local config, or the explicit file (which must load)
    if let Some(path) = &overrides.config_path {
        merge_config(&mut config, load_config_file(path)?);
    } else if let Some(repo_config) = &sources.repo {
        match load_config_file(repo_config) {
            Ok(file_config) => merge_config(&mut config, file_config),
            Err(e) => warn!("Failed to parse repo config at {repo_config:?}: {e}"),
        }
    }

    // 2. Environment
    apply_env_overrides(&mut config);

    // 1. Command line
    apply_cli_overrides(&mut config, overrides);

    Ok(config)
}

/// The global and repo-local config paths `resolve_config` would read
pub fn config_sources(
    overrides: &ConfigOverrides,
    current_dir: &Path,
    home_dir: &Path,
) -> ConfigSources {
    ConfigSources {
        global: config_dir(home_dir).join("config.toml"),
        repo: overrides
            .config_path
            .clone()
            .or_else(|| find_repo_local_config(current_dir)),
    }
}

/// Searches current directory and parents up to the git root
fn find_repo_local_config(current_dir: &Path) -> Option<PathBuf> {
    let mut dir = current_dir;

    loop {
        let config_path = dir.join(REPO_CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if dir.join(".git").exists() {
            break;
        }

        dir = dir.parent()?;
    }

    None
}

fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

/// Merge file config into base config
fn merge_config(base: &mut Config, file: Config) {
    if file.admin.dir.is_some() {
        base.admin.dir = file.admin.dir;
    }

    // Capability lists accumulate across sources
    for id in file.capabilities.installed {
        if !base.capabilities.installed.contains(&id) {
            base.capabilities.installed.push(id);
        }
    }
    for id in file.capabilities.available {
        if !base.capabilities.available.contains(&id) {
            base.capabilities.available.push(id);
        }
    }

    base.variables.extend(file.variables);

    // Later sources replace run configurations of the same name
    for run in file.run_configurations {
        match base.run_configurations.iter_mut().find(|r| r.name == run.name) {
            Some(existing) => *existing = run,
            None => base.run_configurations.push(run),
        }
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(dir) = std::env::var("AEL_ADMIN_DIR")
        && !dir.trim().is_empty()
    {
        config.admin.dir = Some(PathBuf::from(dir.trim()));
    }

    if let Ok(version) = std::env::var("AEL_DAEMON_VERSION") {
        config
            .variables
            .insert(DAEMON_VERSION_VARIABLE.to_string(), version);
    }
}

fn apply_cli_overrides(config: &mut Config, overrides: &ConfigOverrides) {
    if let Some(ref dir) = overrides.admin_dir {
        config.admin.dir = Some(dir.clone());
    }

    for (name, value) in &overrides.variables {
        config.variables.insert(name.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use tempfile::TempDir;

    fn clear_env() {
        unsafe {
            env::remove_var("AEL_ADMIN_DIR");
            env::remove_var("AEL_DAEMON_VERSION");
        }
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();

        let config =
            resolve_config(&ConfigOverrides::default(), temp_dir.path(), temp_dir.path()).unwrap();

        assert!(config.admin.dir.is_none());
        assert!(config.variables.is_empty());
        assert!(config.run_configurations.is_empty());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        unsafe {
            env::set_var("AEL_ADMIN_DIR", "/tmp/ael-admin");
            env::set_var("AEL_DAEMON_VERSION", "1.0");
        }

        let config =
            resolve_config(&ConfigOverrides::default(), temp_dir.path(), temp_dir.path()).unwrap();

        assert_eq!(config.admin.dir, Some(PathBuf::from("/tmp/ael-admin")));
        assert_eq!(
            config.variables.get(DAEMON_VERSION_VARIABLE).map(String::as_str),
            Some("1.0")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_cli_overrides_beat_env() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        unsafe {
            env::set_var("AEL_DAEMON_VERSION", "1.0");
        }
        let overrides = ConfigOverrides {
            admin_dir: Some(PathBuf::from("/cli/admin")),
            variables: vec![(DAEMON_VERSION_VARIABLE.to_string(), "2.0".to_string())],
            config_path: None,
        };

        let config = resolve_config(&overrides, temp_dir.path(), temp_dir.path()).unwrap();

        assert_eq!(config.admin.dir, Some(PathBuf::from("/cli/admin")));
        assert_eq!(
            config.variables.get(DAEMON_VERSION_VARIABLE).map(String::as_str),
            Some("2.0")
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_repo_overrides_global() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let home_dir = temp_dir.path();
        let repo_dir = temp_dir.path().join("repo");
        let sub_dir = repo_dir.join("jobs");
        std::fs::create_dir_all(&sub_dir).unwrap();
        std::fs::create_dir_all(repo_dir.join(".git")).unwrap();

        let global_dir = config_dir(home_dir);
        std::fs::create_dir_all(&global_dir).unwrap();
        std::fs::write(
            global_dir.join("config.toml"),
            r#"
[capabilities]
installed = ["ael-security"]

[[run_configurations]]
name = "cluster"
schema = "http://"
url = "global-host:53000"

[[run_configurations]]
name = "global-only"
"#,
        )
        .unwrap();

        std::fs::write(
            repo_dir.join(REPO_CONFIG_FILE),
            r#"
[capabilities]
available = ["pentaho-kerberos-jaas"]

[[run_configurations]]
name = "cluster"
schema = "http://"
url = "repo-host:53000"
"#,
        )
        .unwrap();

        let config = resolve_config(&ConfigOverrides::default(), &sub_dir, home_dir).unwrap();

        assert_eq!(config.run_configurations.len(), 2);
        assert_eq!(config.run_configuration("cluster").unwrap().url(), "repo-host:53000");
        assert!(config.run_configuration("global-only").is_some());
        assert_eq!(config.capabilities.installed, vec!["ael-security"]);
        assert_eq!(config.capabilities.available, vec!["pentaho-kerberos-jaas"]);
    }

    #[test]
    #[serial]
    fn test_malformed_repo_config_is_skipped() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join(".git")).unwrap();
        std::fs::write(temp_dir.path().join(REPO_CONFIG_FILE), "invalid toml [[[").unwrap();

        let config =
            resolve_config(&ConfigOverrides::default(), temp_dir.path(), temp_dir.path()).unwrap();
        assert!(config.run_configurations.is_empty());
    }

    #[test]
    #[serial]
    fn test_explicit_config_path_must_parse() {
        clear_env();
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "invalid toml [[[").unwrap();

        let overrides = ConfigOverrides {
            config_path: Some(path),
            ..ConfigOverrides::default()
        };
        let result = resolve_config(&overrides, temp_dir.path(), temp_dir.path());
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_repo_search_stops_at_git_root() {
        let temp_dir = TempDir::new().unwrap();
        let repo_dir = temp_dir.path().join("repo");
        std::fs::create_dir_all(repo_dir.join(".git")).unwrap();
        std::fs::write(temp_dir.path().join(REPO_CONFIG_FILE), "").unwrap();

        assert!(find_repo_local_config(&repo_dir).is_none());
    }
}
