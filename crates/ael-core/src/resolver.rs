//! Run configuration resolution for the remote Spark engine
//!
//! Applying a [`RunConfiguration`] does, in order:
//!
//! 1. Request the kerberos JAAS capability when AEL security is installed.
//! 2. Derive protocol, host and port from `schema + url`.
//! 3. Pick the daemon protocol from `KETTLE_AEL_PDI_DAEMON_VERSION`.
//! 4. Detect server vs standalone deployment.
//! 5. For the websocket daemon (v2), set `engine.protocol/host/port`.
//! 6. Standalone only: write (v1) or clean up (v2) zookeeper discovery
//!    settings. For v1 the `engine.*` endpoint variables are cleared.
//! 7. Always select the remote Spark engine.
//!
//! | v2    | server | engine.* set | zookeeper.*          |
//! |-------|--------|--------------|----------------------|
//! | true  | true   | yes          | untouched            |
//! | true  | false  | yes          | keys removed         |
//! | false | true   | no           | untouched            |
//! | false | false  | cleared      | host/port written    |

use crate::admin::{
    AdminError, ConfigurationAdmin, ZOOKEEPER_DISCOVERY_PID, ZOOKEEPER_HOST_PROPERTY,
    ZOOKEEPER_PORT_PROPERTY,
};
use crate::capability::{
    AEL_SECURITY_CAPABILITY_ID, CapabilityManager, CapabilityState, JAAS_CAPABILITY_ID,
    PENTAHO_SERVER_CAPABILITY_ID,
};
use crate::run_config::{ConnectionEndpoint, EndpointError, RunConfiguration};
use crate::variables::{
    DAEMON_VERSION_VARIABLE, ENGINE_HOST_VARIABLE, ENGINE_PORT_VARIABLE,
    ENGINE_PROTOCOL_VARIABLE, ENGINE_REMOTE_VARIABLE, ENGINE_VARIABLE, VariableSink,
};
use crate::version::{DEFAULT_DAEMON_VERSION, DaemonVersion, ProtocolVersion};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_PROTOCOL: &str = "http";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_ZOOKEEPER_PORT: &str = "2181";
pub const DEFAULT_WEBSOCKET_PORT: &str = "53000";

pub const REMOTE_ENGINE: &str = "remote";
pub const SPARK_ENGINE: &str = "spark";

/// Where the resolver is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeploymentMode {
    /// Inside the managed server, which handles discovery itself
    Server,
    /// Unmanaged deployment that configures discovery directly
    Standalone,
}

/// What happened to the zookeeper discovery configuration
#[derive(Debug)]
pub enum DiscoveryOutcome {
    /// Server mode; discovery settings were not touched
    Skipped,
    /// The discovery configuration has no properties; nothing written
    NoProperties,
    /// v1: zookeeper host and port written
    Configured { host: String, port: String },
    /// v2: stale zookeeper keys removed (count of keys actually present)
    Cleaned { removed: usize },
    /// Fetching or persisting the configuration failed. Non-fatal: the
    /// engine selector variables were still applied.
    Failed(AdminError),
}

impl DiscoveryOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, DiscoveryOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&AdminError> {
        match self {
            DiscoveryOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Summary of one `execute` call
#[derive(Debug)]
pub struct Resolution {
    pub version: DaemonVersion,
    pub mode: DeploymentMode,
    pub endpoint: ConnectionEndpoint,
    /// True when the JAAS capability install was requested
    pub jaas_install_requested: bool,
    pub discovery: DiscoveryOutcome,
}

impl Resolution {
    pub fn protocol(&self) -> ProtocolVersion {
        self.version.protocol()
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid run configuration endpoint: {0}")]
    InvalidEndpoint(#[from] EndpointError),
}

/// Applies a run configuration to an execution's variables.
///
/// Implemented per engine type; the host dispatches on the run
/// configuration's type.
pub trait RunConfigurationExecutor {
    fn execute(
        &self,
        run: &RunConfiguration,
        variables: &mut dyn VariableSink,
    ) -> Result<Resolution, ResolveError>;
}

/// Resolver for Spark run configurations.
///
/// Holds the capability manager and configuration admin it reads and
/// mutates. The discovery update is a non-atomic read-modify-write on the
/// shared admin: concurrent `execute` calls that must not interleave have
/// to be serialized by the caller.
#[derive(Clone)]
pub struct ConfigurationResolver {
    capabilities: Arc<dyn CapabilityManager>,
    admin: Arc<dyn ConfigurationAdmin>,
}

impl ConfigurationResolver {
    pub fn new(capabilities: Arc<dyn CapabilityManager>, admin: Arc<dyn ConfigurationAdmin>) -> Self {
        Self {
            capabilities,
            admin,
        }
    }

    /// Server iff the server capability is registered, installed or not
    pub fn deployment_mode(&self) -> DeploymentMode {
        if self.capabilities.capability(PENTAHO_SERVER_CAPABILITY_ID).exists() {
            DeploymentMode::Server
        } else {
            DeploymentMode::Standalone
        }
    }

    /// Request JAAS when AEL security is installed and JAAS is registered
    /// but not installed. Returns whether an install was requested.
    fn bootstrap_security(&self) -> bool {
        if !self
            .capabilities
            .capability(AEL_SECURITY_CAPABILITY_ID)
            .is_installed()
        {
            return false;
        }
        if self.capabilities.capability(JAAS_CAPABILITY_ID) != CapabilityState::NotInstalled {
            return false;
        }

        debug!(capability = JAAS_CAPABILITY_ID, "AEL security installed, requesting JAAS");
        if let Err(e) = self.capabilities.install(JAAS_CAPABILITY_ID) {
            warn!(capability = JAAS_CAPABILITY_ID, error = %e, "Capability install failed");
        }
        true
    }

    fn update_discovery(
        &self,
        protocol: ProtocolVersion,
        endpoint: &ConnectionEndpoint,
        variables: &mut dyn VariableSink,
    ) -> Result<DiscoveryOutcome, AdminError> {
        let mut configuration = self.admin.configuration(ZOOKEEPER_DISCOVERY_PID)?;
        let Some(mut properties) = configuration.properties() else {
            debug!(pid = configuration.pid(), "No discovery properties, skipping");
            return Ok(DiscoveryOutcome::NoProperties);
        };

        let outcome = match protocol {
            ProtocolVersion::V1 => {
                let host = endpoint.host.as_deref().unwrap_or(DEFAULT_HOST).to_string();
                let port = endpoint
                    .port
                    .as_deref()
                    .unwrap_or(DEFAULT_ZOOKEEPER_PORT)
                    .to_string();
                properties.insert(ZOOKEEPER_HOST_PROPERTY.to_string(), host.clone().into());
                properties.insert(ZOOKEEPER_PORT_PROPERTY.to_string(), port.clone().into());

                // websocket endpoint variables must not coexist with zookeeper discovery
                variables.set_variable(ENGINE_PROTOCOL_VARIABLE, None);
                variables.set_variable(ENGINE_HOST_VARIABLE, None);
                variables.set_variable(ENGINE_PORT_VARIABLE, None);

                DiscoveryOutcome::Configured { host, port }
            }
            ProtocolVersion::V2 => {
                let removed = [ZOOKEEPER_HOST_PROPERTY, ZOOKEEPER_PORT_PROPERTY]
                    .into_iter()
                    .filter(|key| properties.remove(*key).is_some())
                    .count();
                DiscoveryOutcome::Cleaned { removed }
            }
        };

        configuration.update(properties)?;
        debug!(pid = configuration.pid(), ?outcome, "Discovery configuration updated");
        Ok(outcome)
    }
}

impl RunConfigurationExecutor for ConfigurationResolver {
    fn execute(
        &self,
        run: &RunConfiguration,
        variables: &mut dyn VariableSink,
    ) -> Result<Resolution, ResolveError> {
        // Validate before any side effect
        let endpoint = run.endpoint()?;

        let jaas_install_requested = self.bootstrap_security();

        let version = DaemonVersion::parse(
            &variables.variable(DAEMON_VERSION_VARIABLE, DEFAULT_DAEMON_VERSION),
        );
        let protocol = version.protocol();
        let mode = self.deployment_mode();
        debug!(
            run_configuration = %run.name,
            version = version.value,
            protocol = ?protocol,
            mode = ?mode,
            "Resolving run configuration"
        );

        if protocol == ProtocolVersion::V2 {
            variables.set_variable(
                ENGINE_PROTOCOL_VARIABLE,
                Some(endpoint.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL)),
            );
            variables.set_variable(
                ENGINE_HOST_VARIABLE,
                Some(endpoint.host.as_deref().unwrap_or(DEFAULT_HOST)),
            );
            variables.set_variable(
                ENGINE_PORT_VARIABLE,
                Some(endpoint.port.as_deref().unwrap_or(DEFAULT_WEBSOCKET_PORT)),
            );
        }

        let discovery = match mode {
            DeploymentMode::Server => DiscoveryOutcome::Skipped,
            DeploymentMode::Standalone => self
                .update_discovery(protocol, &endpoint, variables)
                .unwrap_or_else(DiscoveryOutcome::Failed),
        };

        variables.set_variable(ENGINE_VARIABLE, Some(REMOTE_ENGINE));
        variables.set_variable(ENGINE_REMOTE_VARIABLE, Some(SPARK_ENGINE));

        info!(
            run_configuration = %run.name,
            protocol = ?protocol,
            mode = ?mode,
            discovery_failed = discovery.is_failed(),
            "Applied run configuration"
        );

        Ok(Resolution {
            version,
            mode,
            endpoint,
            jaas_install_requested,
            discovery,
        })
    }
}
