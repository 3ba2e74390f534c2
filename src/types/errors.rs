use std::io;
use std::path::PathBuf;

use thiserror::Error;

// === ConfigError ===

/// Errors raised while reading or writing `config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform did not report a configuration directory.
    #[error("Config directory unavailable")]
    NoConfigDir,
    /// An I/O error occurred while touching the config file.
    #[error("Config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The config file could not be encoded or decoded.
    #[error("Config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// === FsError ===

/// Errors from filesystem helpers and the directory dialog.
#[derive(Debug, Error)]
pub enum FsError {
    /// The user's home directory could not be determined.
    #[error("Home directory unavailable")]
    NoHomeDir,
    /// The platform cache directory could not be determined.
    #[error("Cache directory unavailable")]
    NoCacheDir,
    /// An I/O error occurred on the given path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Walking a directory tree failed.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    /// No native dialog is available in this build.
    #[error("Directory dialog unavailable: {0}")]
    DialogUnavailable(String),
    /// Launching the platform file manager failed.
    #[error("Could not open file manager: {0}")]
    Launch(String),
}

impl FsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsError::Io {
            path: path.into(),
            source,
        }
    }
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }
}

// === LoaderError ===

/// Errors inside the `/localroot` file handler. Each maps to an HTTP status.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The file could not be read.
    #[error("File not found: {0}")]
    NotFound(String),
    /// The request body could not be written to disk.
    #[error("Write failed for {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: io::Error,
    },
    /// The requested byte range cannot be satisfied.
    #[error("Range not satisfiable for length {0}")]
    RangeNotSatisfiable(u64),
}
