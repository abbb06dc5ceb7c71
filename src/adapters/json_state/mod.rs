//! JSON-backed directory history
//!
//! Stores [`DirectoryState`] in `config.json` beside the executable unless
//! another path is given. A missing file is normal on first run; an
//! unreadable one is logged and replaced by defaults on the next save.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::DirectoryState;
use crate::ports::*;
use crate::utils::path::executable_dir;

/// Default state file name
pub const STATE_FILENAME: &str = "config.json";

/// JSON state adapter
pub struct JsonStateAdapter {
    path: PathBuf,
}

impl JsonStateAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// State file next to the running executable
    pub fn beside_executable() -> Self {
        Self::new(executable_dir().join(STATE_FILENAME))
    }
}

#[async_trait]
impl StatePort for JsonStateAdapter {
    async fn load_state(&self) -> DirectoryState {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file yet");
                return DirectoryState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not read state file");
                return DirectoryState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt state file");
                DirectoryState::default()
            }
        }
    }

    async fn save_state(&self, state: &DirectoryState) -> Result<(), DomainError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| DomainError::InternalError(format!("Failed to encode state: {}", e)))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::FsFail(format!("Failed to create state directory: {}", e)))?;
        }
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to write state file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn state_file_path(&self) -> &Path {
        &self.path
    }
}
