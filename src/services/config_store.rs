// PulseFlow Config Store
// Reads, writes and resets `config.json` in the platform config directory.
// The file is opened and closed within each call; nothing is cached between calls.

use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::platform;
use crate::types::config::Config;
use crate::types::errors::ConfigError;

/// Trait defining the config store interface.
pub trait ConfigStoreTrait {
    fn get_or_create(&self) -> Result<Config, ConfigError>;
    fn save(&self, config: &Config) -> Result<(), ConfigError>;
    fn reset(&self) -> Result<Config, ConfigError>;
    fn config_path(&self) -> &Path;
}

/// Config store backed by a single JSON file on disk.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Creates a store at the platform config location (`<config dir>/pulseflow/config.json`).
    pub fn new() -> Result<Self, ConfigError> {
        let config_path = platform::get_config_file().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self { config_path })
    }

    /// Creates a store that reads and writes `path` directly.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    fn ensure_parent_dir(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
            }
        }
        Ok(())
    }
}

/// Encodes a config the way it is stored on disk: compact JSON plus a trailing newline.
pub fn encode_config(config: &Config) -> Result<Vec<u8>, ConfigError> {
    let mut bytes = serde_json::to_vec(config)?;
    bytes.push(b'\n');
    Ok(bytes)
}

impl ConfigStoreTrait for ConfigStore {
    /// Loads the config, writing defaults first if the file is missing or empty.
    ///
    /// A file with malformed JSON is reported as an error and left untouched.
    fn get_or_create(&self) -> Result<Config, ConfigError> {
        self.ensure_parent_dir()?;

        let path = &self.config_path;
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| ConfigError::io(path, e))?;

        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|e| ConfigError::io(path, e))?;

        if content.is_empty() {
            let config = Config::default();
            file.write_all(&encode_config(&config)?)
                .map_err(|e| ConfigError::io(path, e))?;
            info!(path = %path.display(), "created default config");
            return Ok(config);
        }

        let config: Config = serde_json::from_slice(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Overwrites the config file with `config`.
    fn save(&self, config: &Config) -> Result<(), ConfigError> {
        self.ensure_parent_dir()?;
        let bytes = encode_config(config)?;
        fs::write(&self.config_path, bytes).map_err(|e| ConfigError::io(&self.config_path, e))?;
        debug!(path = %self.config_path.display(), "saved config");
        Ok(())
    }

    /// Saves and returns the default config.
    fn reset(&self) -> Result<Config, ConfigError> {
        let config = Config::default();
        self.save(&config)?;
        info!(path = %self.config_path.display(), "config reset to defaults");
        Ok(config)
    }

    fn config_path(&self) -> &Path {
        &self.config_path
    }
}
