//! Run-configuration resolution for the AEL remote engine
//!
//! Turns a stored run configuration (schema + url) into the `engine.*`
//! execution variables and, for standalone deployments, the zookeeper
//! discovery settings used by the v1 daemon.
//!
//! The platform pieces the resolver talks to are traits so hosts can plug
//! in their own:
//! - [`capability::CapabilityManager`] for capability lookup and install
//! - [`variables::VariableSink`] for execution variables
//! - [`admin::ConfigurationAdmin`] for persisted discovery settings

pub mod admin;
pub mod capability;
pub mod config;
pub mod home;
pub mod logging;
pub mod resolver;
pub mod run_config;
pub mod variables;
pub mod version;

pub use admin::{ConfigurationAdmin, FileConfigAdmin, MemoryConfigAdmin, Properties};
pub use capability::{CapabilityManager, CapabilityRegistry, CapabilityState};
pub use resolver::{
    ConfigurationResolver, DeploymentMode, DiscoveryOutcome, Resolution, ResolveError,
    RunConfigurationExecutor,
};
pub use run_config::{ConnectionEndpoint, RunConfiguration};
pub use variables::{VariableSink, VariableSpace};
pub use version::{DaemonVersion, ProtocolVersion};
