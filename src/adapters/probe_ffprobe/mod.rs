//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe` with JSON output and maps the format and stream sections
//! onto [`VideoMetadata`]. Missing creation tags fall back to the file's
//! modification time; a missing size falls back to the file system.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::adapters::env_tools::{spawn_error, tool_command};
use crate::adapters::exec_ffmpeg::{stderr_tail, STDERR_TAIL_LIMIT};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    size: Option<String>,
    #[serde(default)]
    tags: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// File system facts used when the container is silent
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFallback {
    pub modified: Option<SystemTime>,
    pub size: Option<u64>,
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    ffprobe: PathBuf,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter for a resolved executable
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }
}

/// Map raw ffprobe JSON onto metadata
pub fn parse_probe_output(
    path: &Path,
    json: &str,
    fallback: FileFallback,
) -> Result<VideoMetadata, DomainError> {
    let parsed: ProbeOutput = serde_json::from_str(json).map_err(|e| {
        DomainError::ProbeFailed(format!(
            "Unreadable ffprobe output for {}: {}",
            path.display(),
            e
        ))
    })?;

    let duration = parsed
        .format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    let tagged = parsed
        .format
        .tags
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("creation_time"))
        .and_then(|(_, value)| value.as_str())
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|time| time.with_timezone(&Local));

    let (created, created_source) = match (tagged, fallback.modified) {
        (Some(time), _) => (Some(time), CreationSource::ContainerTag),
        (None, Some(modified)) => (
            Some(DateTime::<Local>::from(modified)),
            CreationSource::FileModified,
        ),
        (None, None) => (None, CreationSource::Unknown),
    };

    let size_bytes = parsed
        .format
        .size
        .as_deref()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .or(fallback.size);

    let streams = parsed
        .streams
        .into_iter()
        .map(|stream| StreamSummary {
            index: stream.index,
            kind: stream.codec_type.unwrap_or_else(|| "unknown".to_string()),
            codec: stream.codec_name,
            width: stream.width,
            height: stream.height,
        })
        .collect();

    Ok(VideoMetadata {
        path: path.to_path_buf(),
        duration,
        created,
        created_source,
        size_bytes,
        streams,
    })
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, file_path: &Path) -> Result<VideoMetadata, DomainError> {
        let fs_meta = tokio::fs::metadata(file_path)
            .await
            .map_err(|_| DomainError::FileNotFound(file_path.display().to_string()))?;
        let fallback = FileFallback {
            modified: fs_meta.modified().ok(),
            size: Some(fs_meta.len()),
        };

        debug!(path = %file_path.display(), "Probing");
        let output = tool_command(&self.ffprobe)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(file_path)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .output()
            .await
            .map_err(|e| spawn_error(&self.ffprobe, e))?;

        if !output.status.success() {
            warn!(path = %file_path.display(), status = %output.status, "ffprobe failed");
            return Err(DomainError::ProbeFailed(format!(
                "ffprobe could not read {} ({}): {}",
                file_path.display(),
                output.status,
                stderr_tail(&output.stderr, STDERR_TAIL_LIMIT)
            )));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        parse_probe_output(file_path, &json, fallback)
    }
}
