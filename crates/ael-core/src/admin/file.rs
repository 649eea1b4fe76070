//! File-backed configuration admin: one `<pid>.toml` per configuration

use super::{AdminError, Configuration, ConfigurationAdmin, Properties, validate_pid};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Stores each configuration as a TOML table in `dir/<pid>.toml`.
///
/// A missing file is a configuration that exists but has no properties.
#[derive(Debug, Clone)]
pub struct FileConfigAdmin {
    dir: PathBuf,
}

impl FileConfigAdmin {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `pid`
    pub fn path_for(&self, pid: &str) -> Result<PathBuf, AdminError> {
        validate_pid(pid)?;
        Ok(self.dir.join(format!("{pid}.toml")))
    }
}

impl ConfigurationAdmin for FileConfigAdmin {
    fn configuration(&self, pid: &str) -> Result<Box<dyn Configuration + '_>, AdminError> {
        let path = self.path_for(pid)?;
        let properties = read_properties(pid, &path)?;
        tracing::debug!(pid = %pid, path = %path.display(), found = properties.is_some(), "Loaded configuration");
        Ok(Box::new(FileConfiguration {
            pid: pid.to_string(),
            path,
            properties,
        }))
    }
}

struct FileConfiguration {
    pid: String,
    path: PathBuf,
    properties: Option<Properties>,
}

impl Configuration for FileConfiguration {
    fn pid(&self) -> &str {
        &self.pid
    }

    fn properties(&self) -> Option<Properties> {
        self.properties.clone()
    }

    fn update(&mut self, properties: Properties) -> Result<(), AdminError> {
        let contents = toml::to_string(&properties).map_err(|source| AdminError::Serialize {
            pid: self.pid.clone(),
            source,
        })?;
        write_atomic(&self.path, contents.as_bytes()).map_err(|source| AdminError::Io {
            pid: self.pid.clone(),
            source,
        })?;
        tracing::debug!(pid = %self.pid, path = %self.path.display(), "Persisted configuration");
        self.properties = Some(properties);
        Ok(())
    }
}

fn read_properties(pid: &str, path: &Path) -> Result<Option<Properties>, AdminError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(AdminError::Io {
                pid: pid.to_string(),
                source,
            });
        }
    };
    let properties = toml::from_str::<Properties>(&contents).map_err(|source| AdminError::Parse {
        pid: pid.to_string(),
        source,
    })?;
    Ok(Some(properties))
}

/// Write to a sibling tmp file, fsync, then rename over the target
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    {
        let mut tmp_file = fs::File::create(&tmp_path)?;
        tmp_file.write_all(contents)?;
        tmp_file.sync_all()?;
    }
    fs::rename(&tmp_path, path)
}
