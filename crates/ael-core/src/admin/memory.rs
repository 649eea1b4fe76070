//! In-memory configuration admin

use super::{AdminError, Configuration, ConfigurationAdmin, Properties};
use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, PoisonError};

/// In-memory configuration admin for embedding and tests.
///
/// Fetch and update failures can be injected to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryConfigAdmin {
    store: Mutex<HashMap<String, Properties>>,
    updates: Mutex<Vec<String>>,
    fail_fetch: bool,
    fail_update: bool,
}

impl MemoryConfigAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a configuration with properties
    pub fn with_properties(self, pid: impl Into<String>, properties: Properties) -> Self {
        self.insert(pid, properties);
        self
    }

    /// Every `configuration()` call fails with an I/O error
    pub fn with_fetch_error(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Every `update()` call fails with an I/O error
    pub fn with_update_error(mut self) -> Self {
        self.fail_update = true;
        self
    }

    pub fn insert(&self, pid: impl Into<String>, properties: Properties) {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pid.into(), properties);
    }

    /// Stored properties for `pid`
    pub fn get(&self, pid: &str) -> Option<Properties> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pid)
            .cloned()
    }

    /// Pids passed to successful `update()` calls, in order
    pub fn updates(&self) -> Vec<String> {
        self.updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConfigurationAdmin for MemoryConfigAdmin {
    fn configuration(&self, pid: &str) -> Result<Box<dyn Configuration + '_>, AdminError> {
        if self.fail_fetch {
            return Err(AdminError::Io {
                pid: pid.to_string(),
                source: io::Error::other("configuration store unavailable"),
            });
        }
        Ok(Box::new(MemoryConfiguration {
            admin: self,
            pid: pid.to_string(),
            properties: self.get(pid),
        }))
    }
}

struct MemoryConfiguration<'a> {
    admin: &'a MemoryConfigAdmin,
    pid: String,
    properties: Option<Properties>,
}

impl Configuration for MemoryConfiguration<'_> {
    fn pid(&self) -> &str {
        &self.pid
    }

    fn properties(&self) -> Option<Properties> {
        self.properties.clone()
    }

    fn update(&mut self, properties: Properties) -> Result<(), AdminError> {
        if self.admin.fail_update {
            return Err(AdminError::Io {
                pid: self.pid.clone(),
                source: io::Error::other("configuration store is read-only"),
            });
        }
        self.admin.insert(self.pid.clone(), properties.clone());
        self.admin
            .updates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(self.pid.clone());
        self.properties = Some(properties);
        Ok(())
    }
}
