// PulseFlow platform paths
// Resolves the per-OS configuration, cache and home directories.
//
// - Linux:   ~/.config/pulseflow, ~/.cache/pulseflow
// - macOS:   ~/Library/Application Support/pulseflow, ~/Library/Caches/pulseflow
// - Windows: %APPDATA%\pulseflow, %LOCALAPPDATA%\pulseflow

use std::env;
use std::path::PathBuf;

/// Directory name used under every platform base directory.
pub const APP_DIR_NAME: &str = "pulseflow";

/// File name of the persisted configuration.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable that replaces the whole config directory.
pub const CONFIG_DIR_ENV: &str = "PULSEFLOW_CONFIG_DIR";

/// Returns the PulseFlow configuration directory.
///
/// `PULSEFLOW_CONFIG_DIR` wins when set and non-empty.
pub fn get_config_dir() -> Option<PathBuf> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|base| base.join(APP_DIR_NAME))
}

/// Returns the full path of `config.json`.
pub fn get_config_file() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Returns the PulseFlow cache directory (not created).
pub fn get_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|base| base.join(APP_DIR_NAME))
}

/// Returns the current user's home directory.
pub fn get_home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}
