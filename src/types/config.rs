use serde::{Deserialize, Deserializer, Serialize};

/// Schema version written by `reset` and on first launch.
pub const CONFIG_VERSION: i64 = 1;

/// Persisted application configuration (`config.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub setup_done: bool,
    pub version: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub music_directories: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            setup_done: false,
            version: CONFIG_VERSION,
            music_directories: Vec::new(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
