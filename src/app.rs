//! App Core for PulseFlow.
//!
//! The methods on [`App`] are the surface bound to the front-end. Each one is a
//! single delegation to the config store, a filesystem helper or the dialog.

use std::path::PathBuf;

use crate::services::config_store::{ConfigStore, ConfigStoreTrait};
use crate::services::dialog::{self, DirectoryPicker};
use crate::services::file_system;
use crate::types::config::Config;
use crate::types::errors::{ConfigError, FsError};

/// Central application struct bound to the front-end.
pub struct App {
    pub config_store: ConfigStore,
    picker: Box<dyn DirectoryPicker>,
}

impl App {
    /// Creates an App using the platform config location and the build's default picker.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self::with_parts(ConfigStore::new()?, dialog::default_picker()))
    }

    /// Creates an App from explicit parts (tests, headless hosts).
    pub fn with_parts(config_store: ConfigStore, picker: Box<dyn DirectoryPicker>) -> Self {
        Self {
            config_store,
            picker,
        }
    }

    pub fn greet(&self, name: &str) -> String {
        format!("Hello {}, It's show time!", name)
    }

    pub fn get_or_create_config(&self) -> Result<Config, ConfigError> {
        self.config_store.get_or_create()
    }

    pub fn save_config(&self, config: &Config) -> Result<(), ConfigError> {
        self.config_store.save(config)
    }

    pub fn reset_config(&self) -> Result<Config, ConfigError> {
        self.config_store.reset()
    }

    pub fn walk_dir(&self, path: &str) -> Result<Vec<String>, FsError> {
        file_system::walk_dir(path)
    }

    pub fn list_audio_files(&self, path: &str) -> Result<Vec<String>, FsError> {
        file_system::list_audio_files(path)
    }

    pub fn get_home_dir(&self) -> Result<String, FsError> {
        Ok(path_string(file_system::home_dir()?))
    }

    /// Opens the directory dialog. A cancelled dialog yields an empty string.
    pub fn pick_directory(&self, title: &str) -> Result<String, FsError> {
        Ok(self
            .picker
            .pick_directory(title)?
            .map(path_string)
            .unwrap_or_default())
    }

    pub fn split_path(&self, path: &str) -> Vec<String> {
        file_system::split_path(path)
    }

    pub fn join_path<S: AsRef<str>>(&self, paths: &[S]) -> String {
        file_system::join_path(paths)
    }

    pub fn get_or_create_cache_dir(&self) -> Result<String, FsError> {
        Ok(path_string(file_system::get_or_create_cache_dir()?))
    }

    pub fn show_in_folder(&self, path: &str) -> Result<(), FsError> {
        file_system::show_in_folder(path)
    }
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}
