//! Platform capabilities: optional, independently installable features

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Registered only when running inside the managed server
pub const PENTAHO_SERVER_CAPABILITY_ID: &str = "pentaho-server";
/// Kerberos JAAS support, provisioned on demand for secured AEL
pub const JAAS_CAPABILITY_ID: &str = "pentaho-kerberos-jaas";
/// AEL security feature
pub const AEL_SECURITY_CAPABILITY_ID: &str = "ael-security";

/// Observable state of a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityState {
    /// Not registered with the platform
    Absent,
    /// Registered, not installed
    NotInstalled,
    /// Registered and installed
    Installed,
}

impl CapabilityState {
    pub fn exists(self) -> bool {
        !matches!(self, CapabilityState::Absent)
    }

    pub fn is_installed(self) -> bool {
        matches!(self, CapabilityState::Installed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityState::Absent => "absent",
            CapabilityState::NotInstalled => "not_installed",
            CapabilityState::Installed => "installed",
        }
    }
}

#[derive(Debug, Error)]
pub enum CapabilityError {
    #[error("capability {id} is not registered")]
    Unknown { id: String },

    #[error("failed to install capability {id}: {message}")]
    Install { id: String, message: String },
}

/// Lookup and provisioning of platform capabilities.
///
/// `install` is a request: callers do not wait on or consume any completion
/// signal beyond the immediate result.
pub trait CapabilityManager: Send + Sync {
    fn capability(&self, id: &str) -> CapabilityState;

    fn install(&self, id: &str) -> Result<(), CapabilityError>;
}

/// In-memory capability registry.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    states: Mutex<BTreeMap<String, CapabilityState>>,
    install_requests: Mutex<Vec<String>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from installed and available (not installed) ids.
    /// An id listed in both is treated as installed.
    pub fn from_lists<I, A>(installed: I, available: A) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let registry = Self::new();
        for id in available {
            registry.register(id, CapabilityState::NotInstalled);
        }
        for id in installed {
            registry.register(id, CapabilityState::Installed);
        }
        registry
    }

    pub fn with(self, id: impl Into<String>, state: CapabilityState) -> Self {
        self.register(id, state);
        self
    }

    /// Register (or re-register) a capability. Registering as `Absent`
    /// removes it.
    pub fn register(&self, id: impl Into<String>, state: CapabilityState) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        let id = id.into();
        if state.exists() {
            states.insert(id, state);
        } else {
            states.remove(&id);
        }
    }

    /// Ids passed to `install`, in call order
    pub fn install_requests(&self) -> Vec<String> {
        self.install_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of all registered capabilities
    pub fn snapshot(&self) -> BTreeMap<String, CapabilityState> {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CapabilityManager for CapabilityRegistry {
    fn capability(&self, id: &str) -> CapabilityState {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
            .unwrap_or(CapabilityState::Absent)
    }

    fn install(&self, id: &str) -> Result<(), CapabilityError> {
        self.install_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id.to_string());

        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        match states.get_mut(id) {
            Some(state) => {
                *state = CapabilityState::Installed;
                tracing::info!(capability = %id, "Capability installed");
                Ok(())
            }
            None => Err(CapabilityError::Unknown { id: id.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_is_absent() {
        let registry = CapabilityRegistry::new();
        assert_eq!(registry.capability("nope"), CapabilityState::Absent);
        assert!(!registry.capability("nope").exists());
    }

    #[test]
    fn test_from_lists() {
        let registry = CapabilityRegistry::from_lists(["a", "b"], ["b", "c"]);
        assert_eq!(registry.capability("a"), CapabilityState::Installed);
        assert_eq!(registry.capability("b"), CapabilityState::Installed);
        assert_eq!(registry.capability("c"), CapabilityState::NotInstalled);
        assert_eq!(
            registry.snapshot().into_iter().collect::<Vec<_>>(),
            vec![
                ("a".to_string(), CapabilityState::Installed),
                ("b".to_string(), CapabilityState::Installed),
                ("c".to_string(), CapabilityState::NotInstalled),
            ]
        );
        assert_eq!(CapabilityState::NotInstalled.as_str(), "not_installed");
    }

    #[test]
    fn test_install_marks_installed_and_records_request() {
        let registry =
            CapabilityRegistry::new().with(JAAS_CAPABILITY_ID, CapabilityState::NotInstalled);

        registry.install(JAAS_CAPABILITY_ID).unwrap();

        assert!(registry.capability(JAAS_CAPABILITY_ID).is_installed());
        assert_eq!(registry.install_requests(), vec![JAAS_CAPABILITY_ID.to_string()]);
    }

    #[test]
    fn test_install_unknown_is_error() {
        let registry = CapabilityRegistry::new();
        let err = registry.install("ghost").unwrap_err();
        assert!(matches!(err, CapabilityError::Unknown { .. }));
        assert_eq!(registry.install_requests().len(), 1);
    }

    #[test]
    fn test_register_absent_removes() {
        let registry = CapabilityRegistry::new().with("x", CapabilityState::Installed);
        registry.register("x", CapabilityState::Absent);
        assert_eq!(registry.capability("x"), CapabilityState::Absent);
    }
}
