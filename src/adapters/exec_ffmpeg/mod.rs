//! FFmpeg execution adapter
//!
//! Shells out to the `ffmpeg` binary for single-frame extraction and
//! stream-copy trimming.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::adapters::env_tools::{spawn_error, tool_command};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Bytes of stderr kept in failure messages
pub const STDERR_TAIL_LIMIT: usize = 500;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    ffmpeg: PathBuf,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter for a resolved executable
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Arguments extracting one scaled and cropped JPEG frame
    pub fn thumbnail_args(
        video: &Path,
        at_seconds: f64,
        output: &Path,
        geometry: ThumbnailGeometry,
    ) -> Vec<OsString> {
        let at = if at_seconds.is_finite() {
            at_seconds.max(0.0)
        } else {
            0.0
        };
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-ss".into(),
            format!("{:.3}", at).into(),
            "-i".into(),
            video.as_os_str().to_os_string(),
            "-frames:v".into(),
            "1".into(),
            "-q:v".into(),
            geometry.jpeg_quality.to_string().into(),
            "-vf".into(),
            geometry.filter_expression().into(),
            "-y".into(),
            output.as_os_str().to_os_string(),
        ]
    }

    /// Arguments for a keyframe-aligned stream copy of every stream
    pub fn trim_args(command: &TrimCommand) -> Vec<OsString> {
        vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-ss".into(),
            TimeSpec::from_seconds(command.start).to_ffmpeg_timestamp().into(),
            "-i".into(),
            command.input.as_os_str().to_os_string(),
            "-t".into(),
            format!("{:.3}", command.length).into(),
            "-c".into(),
            "copy".into(),
            "-map".into(),
            "0".into(),
            "-avoid_negative_ts".into(),
            "make_zero".into(),
            "-y".into(),
            command.output.as_os_str().to_os_string(),
        ]
    }

    async fn run(&self, args: Vec<OsString>) -> Result<(), DomainError> {
        debug!(program = %self.ffmpeg.display(), ?args, "Running ffmpeg");
        let output = tool_command(&self.ffmpeg)
            .args(&args)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .output()
            .await
            .map_err(|e| spawn_error(&self.ffmpeg, e))?;

        if output.status.success() {
            return Ok(());
        }

        let code = output
            .status
            .code()
            .map(|code| code.to_string())
            .unwrap_or_else(|| "signal".to_string());
        Err(DomainError::ProcessFailed(format!(
            "ffmpeg exited with code {}: {}",
            code,
            stderr_tail(&output.stderr, STDERR_TAIL_LIMIT)
        )))
    }
}

/// Last `limit` bytes of a tool's stderr, trimmed and lossily decoded
pub fn stderr_tail(stderr: &[u8], limit: usize) -> String {
    let start = stderr.len().saturating_sub(limit);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}

#[async_trait]
impl FramePort for FFmpegAdapter {
    async fn extract_frame(
        &self,
        video: &Path,
        at_seconds: f64,
        output: &Path,
        geometry: ThumbnailGeometry,
    ) -> Result<(), DomainError> {
        self.run(Self::thumbnail_args(video, at_seconds, output, geometry))
            .await
    }
}

#[async_trait]
impl TrimPort for FFmpegAdapter {
    async fn trim(&self, command: &TrimCommand) -> Result<(), DomainError> {
        info!(
            input = %command.input.display(),
            output = %command.output.display(),
            start = command.start,
            length = command.length,
            "Trimming"
        );
        self.run(Self::trim_args(command)).await
    }
}
