//! External tool discovery
//!
//! Resolves the ffmpeg and ffprobe executables and prepares child processes
//! so they never open a console window on Windows.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::domain::errors::DomainError;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Resolved locations of the media tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Resolve both tools; the first one missing is reported
    pub fn resolve(ffmpeg: &str, ffprobe: &str) -> Result<Self, DomainError> {
        Ok(Self {
            ffmpeg: locate_tool(ffmpeg)?,
            ffprobe: locate_tool(ffprobe)?,
        })
    }
}

/// Look a tool up on PATH (or accept an explicit path to an executable)
pub fn locate_tool(name: &str) -> Result<PathBuf, DomainError> {
    which::which(name).map_err(|e| {
        tracing::debug!(tool = name, error = %e, "Tool lookup failed");
        DomainError::ToolMissing(tool_label(name))
    })
}

/// Short display name of a configured tool (`/opt/bin/ffmpeg` -> `ffmpeg`)
pub fn tool_label(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| name.to_string())
}

/// Command for a tool with stdin closed and the child killed if dropped
pub fn tool_command(program: &Path) -> Command {
    let mut command = Command::new(program);
    command
        .stdin(std::process::Stdio::null())
        .kill_on_drop(true);
    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);
    command
}

/// Map a spawn error to a domain error, recognising a missing executable
pub fn spawn_error(program: &Path, error: std::io::Error) -> DomainError {
    if error.kind() == std::io::ErrorKind::NotFound {
        DomainError::ToolMissing(tool_label(&program.to_string_lossy()))
    } else {
        DomainError::ProcessFailed(format!(
            "Failed to start {}: {}",
            program.display(),
            error
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_label() {
        assert_eq!(tool_label("ffmpeg"), "ffmpeg");
        assert_eq!(tool_label("/usr/local/bin/ffprobe"), "ffprobe");
    }

    #[test]
    fn test_missing_tool_is_reported() {
        let err = locate_tool("trimmy-no-such-tool-xyz").unwrap_err();
        assert_eq!(err, DomainError::ToolMissing("trimmy-no-such-tool-xyz".to_string()));
    }

    #[test]
    fn test_spawn_not_found_maps_to_tool_missing() {
        let err = spawn_error(
            Path::new("/nowhere/ffmpeg"),
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert_eq!(err, DomainError::ToolMissing("ffmpeg".to_string()));
    }
}
