// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe a video and return its metadata
    async fn probe(&self, file_path: &Path) -> Result<VideoMetadata, DomainError>;
}

/// Port for single-frame extraction
#[async_trait]
pub trait FramePort: Send + Sync {
    /// Write one frame at `at_seconds` as a JPEG to `output`
    async fn extract_frame(
        &self,
        video: &Path,
        at_seconds: f64,
        output: &Path,
        geometry: ThumbnailGeometry,
    ) -> Result<(), DomainError>;
}

/// Port for stream-copy trimming
#[async_trait]
pub trait TrimPort: Send + Sync {
    /// Run the trimming tool. `Ok` means the tool exited successfully; the
    /// caller still checks that the output exists.
    async fn trim(&self, command: &TrimCommand) -> Result<(), DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Check if file exists
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError>;

    /// Check whether anything (file, directory, link) occupies a path
    async fn path_exists(&self, path: &Path) -> Result<bool, DomainError>;

    /// Check if directory exists
    async fn directory_exists(&self, dir_path: &Path) -> Result<bool, DomainError>;

    /// Get file size
    async fn get_file_size(&self, file_path: &Path) -> Result<u64, DomainError>;

    /// Delete file
    async fn delete_file(&self, file_path: &Path) -> Result<(), DomainError>;

    /// Rename/move file
    async fn move_file(&self, from: &Path, to: &Path) -> Result<(), DomainError>;
}

/// Port for persisted directory history
#[async_trait]
pub trait StatePort: Send + Sync {
    /// Load state; a missing or unreadable file yields the default state
    async fn load_state(&self) -> DirectoryState;

    /// Save state
    async fn save_state(&self, state: &DirectoryState) -> Result<(), DomainError>;

    /// Location of the state file
    fn state_file_path(&self) -> &Path;
}
