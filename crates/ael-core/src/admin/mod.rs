//! Configuration admin: persisted property dictionaries keyed by pid
//!
//! The zookeeper discovery settings used by standalone deployments live in
//! the dictionary stored under [`ZOOKEEPER_DISCOVERY_PID`].
//!
//! Fetching a [`Configuration`] snapshots its properties; `update` writes the
//! whole dictionary back. There is no locking between the two, so concurrent
//! writers to the same pid must be serialized by the caller.

mod file;
mod memory;

pub use file::FileConfigAdmin;
pub use memory::MemoryConfigAdmin;

use thiserror::Error;

/// Zookeeper discovery configuration pid
pub const ZOOKEEPER_DISCOVERY_PID: &str = "org.apache.aries.rsa.discovery.zookeeper";
pub const ZOOKEEPER_HOST_PROPERTY: &str = "zookeeper.host";
pub const ZOOKEEPER_PORT_PROPERTY: &str = "zookeeper.port";

/// Property dictionary of one configuration
pub type Properties = toml::Table;

/// Configuration admin errors
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("I/O error on configuration {pid}: {source}")]
    Io {
        pid: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration {pid} is not valid TOML: {source}")]
    Parse {
        pid: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration {pid}: {source}")]
    Serialize {
        pid: String,
        #[source]
        source: toml::ser::Error,
    },

    #[error("invalid configuration pid: {pid:?}")]
    InvalidPid { pid: String },
}

/// Access to persisted configurations.
pub trait ConfigurationAdmin: Send + Sync {
    /// Fetch the configuration for `pid`, creating an empty one (no
    /// properties) if it does not exist yet.
    fn configuration(&self, pid: &str) -> Result<Box<dyn Configuration + '_>, AdminError>;
}

/// Handle on a single configuration.
pub trait Configuration {
    fn pid(&self) -> &str;

    /// Properties as of fetch time; `None` when never written
    fn properties(&self) -> Option<Properties>;

    /// Replace the stored properties
    fn update(&mut self, properties: Properties) -> Result<(), AdminError>;
}

/// Pids become file names; keep them to a conservative character set.
pub(crate) fn validate_pid(pid: &str) -> Result<(), AdminError> {
    let valid = !pid.is_empty()
        && !pid.starts_with('.')
        && pid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(AdminError::InvalidPid {
            pid: pid.to_string(),
        })
    }
}
