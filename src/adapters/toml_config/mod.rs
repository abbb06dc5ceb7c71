// TOML config adapter - Settings files in TOML

use std::path::{Path, PathBuf};

use crate::config_initialization::Settings;
use crate::error::{TrimmyError, TrimmyResult};
use crate::utils::path::executable_dir;

/// Settings file looked up when no `--config` is given
pub const DEFAULT_CONFIG_FILENAME: &str = "trimmy.toml";

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse settings; absent sections and keys keep their defaults
    pub fn parse(content: &str) -> TrimmyResult<Settings> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a settings file
    pub fn load(path: &Path) -> TrimmyResult<Settings> {
        let content = std::fs::read_to_string(path).map_err(|e| TrimmyError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Settings file to use: the explicit one, else `trimmy.toml` beside the
    /// executable, else in the working directory
    pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        [
            executable_dir().join(DEFAULT_CONFIG_FILENAME),
            PathBuf::from(DEFAULT_CONFIG_FILENAME),
        ]
        .into_iter()
        .find(|candidate| candidate.is_file())
    }
}
