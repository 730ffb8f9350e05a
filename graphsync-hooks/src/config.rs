use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::{fs, io};

use serde::Serialize as _;
use serde_json as json;
use thiserror::Error;

use crate::actions::PersistenceOption;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("configuration JSON error: {0}")]
    Json(#[from] json::Error),
}

/// Hook engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Persistence backends request hooks may select. If empty, any
    /// backend name is accepted.
    #[serde(default)]
    pub persistence: BTreeSet<PersistenceOption>,
}

impl Config {
    /// Load a configuration from the given path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg = json::from_reader(io::BufReader::new(fs::File::open(path)?))?;

        Ok(cfg)
    }

    /// Write configuration to disk. Fails if the path already exists.
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(path)?;
        let formatter = json::ser::PrettyFormatter::with_indent(b"  ");
        let mut serializer = json::Serializer::with_formatter(&file, formatter);

        self.serialize(&mut serializer)?;
        file.write_all(b"\n")?;
        file.sync_all()?;

        Ok(())
    }

    /// Whether request hooks may select the given persistence option.
    pub fn is_allowed(&self, option: &PersistenceOption) -> bool {
        self.persistence.is_empty() || self.persistence.contains(option)
    }
}
