//! Execution-scoped variables

use serde::Serialize;
use std::collections::BTreeMap;

/// Selects the AEL daemon protocol ("1.0" zookeeper, "2.0" websocket)
pub const DAEMON_VERSION_VARIABLE: &str = "KETTLE_AEL_PDI_DAEMON_VERSION";
pub const ENGINE_VARIABLE: &str = "engine";
pub const ENGINE_REMOTE_VARIABLE: &str = "engine.remote";
pub const ENGINE_PROTOCOL_VARIABLE: &str = "engine.protocol";
pub const ENGINE_HOST_VARIABLE: &str = "engine.host";
pub const ENGINE_PORT_VARIABLE: &str = "engine.port";

/// Every variable the resolver may write, in display order
pub const ENGINE_VARIABLES: [&str; 5] = [
    ENGINE_VARIABLE,
    ENGINE_REMOTE_VARIABLE,
    ENGINE_PROTOCOL_VARIABLE,
    ENGINE_HOST_VARIABLE,
    ENGINE_PORT_VARIABLE,
];

/// Variable store for one execution context.
pub trait VariableSink {
    /// Value of `name`, or `default` when unset or cleared
    fn variable(&self, name: &str, default: &str) -> String;

    /// Set `name`; `None` clears it
    fn set_variable(&mut self, name: &str, value: Option<&str>);
}

/// Ordered in-memory variable space.
///
/// A cleared variable stays present with no value so callers can tell
/// "explicitly cleared" apart from "never set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VariableSpace {
    vars: BTreeMap<String, Option<String>>,
}

impl VariableSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the process environment; non-UTF-8 entries are skipped
    pub fn from_env() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, Some(v.into_string().ok()?))))
                .collect(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), Some(value.into()));
        self
    }

    /// Current value; `None` for both unset and cleared
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).and_then(|v| v.as_deref())
    }

    /// True when the variable was set and then cleared
    pub fn is_cleared(&self, name: &str) -> bool {
        matches!(self.vars.get(name), Some(None))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl VariableSink for VariableSpace {
    fn variable(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }

    fn set_variable(&mut self, name: &str, value: Option<&str>) {
        self.vars
            .insert(name.to_string(), value.map(str::to_string));
    }
}
