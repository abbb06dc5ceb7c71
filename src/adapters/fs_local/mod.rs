// Local filesystem adapter - File system operations via tokio::fs

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::ports::*;

/// Local filesystem adapter
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLocalAdapter;

impl FsLocalAdapter {
    /// Create new filesystem adapter
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FsPort for FsLocalAdapter {
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError> {
        match tokio::fs::metadata(file_path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::FsFail(format!(
                "Failed to check {}: {}",
                file_path.display(),
                e
            ))),
        }
    }

    async fn path_exists(&self, path: &Path) -> Result<bool, DomainError> {
        match tokio::fs::symlink_metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::FsFail(format!(
                "Failed to check {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn directory_exists(&self, dir_path: &Path) -> Result<bool, DomainError> {
        Ok(tokio::fs::metadata(dir_path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false))
    }

    async fn get_file_size(&self, file_path: &Path) -> Result<u64, DomainError> {
        let metadata = tokio::fs::metadata(file_path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to get file size: {}", e)))?;
        Ok(metadata.len())
    }

    async fn delete_file(&self, file_path: &Path) -> Result<(), DomainError> {
        tokio::fs::remove_file(file_path)
            .await
            .map_err(|e| DomainError::FsFail(format!("Failed to delete file: {}", e)))
    }

    async fn move_file(&self, from: &Path, to: &Path) -> Result<(), DomainError> {
        tokio::fs::rename(from, to).await.map_err(|e| {
            DomainError::FsFail(format!(
                "Failed to move file from {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })
    }
}
