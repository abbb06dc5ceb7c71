//! Recent video listing

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;
use walkdir::WalkDir;

use crate::domain::errors::DomainError;
use crate::domain::rules::is_video_file;

/// A video file found in a directory
#[derive(Debug, Clone, PartialEq)]
pub struct VideoEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl VideoEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// The `count` most recently modified videos directly inside `dir`, newest first
pub fn recent_videos(
    dir: &Path,
    extensions: &[String],
    count: usize,
) -> Result<Vec<VideoEntry>, DomainError> {
    if !dir.is_dir() {
        return Err(DomainError::FileNotFound(format!(
            "Directory not found: {}",
            dir.display()
        )));
    }

    let mut videos: Vec<VideoEntry> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_video_file(entry.path(), extensions))
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some(VideoEntry {
                path: entry.into_path(),
                modified,
            })
        })
        .collect();

    videos.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
    videos.truncate(count);
    debug!(dir = %dir.display(), found = videos.len(), "Listed recent videos");
    Ok(videos)
}
