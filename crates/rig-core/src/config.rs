use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use rig_util::errors::{Result, RigError};

/// Environment variable that relocates the rig data directory.
pub const RIG_HOME_ENV: &str = "RIG_HOME";

/// Global user configuration loaded from `~/.rig/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolve: ResolveConfig,
}

/// Defaults for `rig resolve` from `[resolve]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Plan output format, `json` or `toml`.
    #[serde(default)]
    pub format: Option<String>,

    /// Schema file used when `--schema` is not given.
    #[serde(default)]
    pub schema: Option<PathBuf>,
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            tracing::debug!("no global config at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| RigError::Config {
            message: format!("Failed to read global config: {e}"),
        })?;
        toml::from_str(&content).map_err(|e| RigError::Config {
            message: format!("Failed to parse global config {}: {e}", path.display()),
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the rig data directory: `$RIG_HOME`, or `~/.rig/`.
pub fn dirs_path() -> PathBuf {
    if let Some(home) = std::env::var_os(RIG_HOME_ENV) {
        return PathBuf::from(home);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".rig")
}
