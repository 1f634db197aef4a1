//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over a file on disk.  Parsing and range
//! validation are delegated to [`SystemConfig::from_json`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::ConfigPort;
use crate::config::SystemConfig;
use crate::error::ConfigError;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound(self.path.display().to_string()),
            _ => ConfigError::Malformed(format!("{}: {}", self.path.display(), e)),
        })?;
        let config = SystemConfig::from_json(&text)?;
        info!(
            "Loaded config from {} ({} triggers, {} sounds)",
            self.path.display(),
            config.triggers.len(),
            config.sounds.len()
        );
        Ok(config)
    }
}
