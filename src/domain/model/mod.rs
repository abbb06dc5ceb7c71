// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Smallest gap kept between start and end, in seconds
pub const DEFAULT_MIN_GAP: f64 = 0.05;

/// Shortest clip the trimming tool is ever asked for, in seconds
pub const MIN_TRIM_LENGTH: f64 = 0.1;

/// Default step for the scrub buttons, in seconds
pub const DEFAULT_SCRUB_INCREMENT: f64 = 0.5;

/// Time specification - seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Create a new TimeSpec from hours, minutes, seconds, milliseconds
    pub fn from_components(hours: u32, minutes: u32, seconds: u32, milliseconds: u32) -> Self {
        let total_seconds = hours as f64 * 3600.0
            + minutes as f64 * 60.0
            + seconds as f64
            + milliseconds as f64 / 1000.0;
        Self {
            seconds: total_seconds,
        }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse time string: seconds (`12.5`), `MM:SS.ms`, or `HH:MM:SS.ms`
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() {
                return Err(DomainError::BadArgs("Time must be a finite number".to_string()));
            }
            if seconds < 0.0 {
                return Err(DomainError::BadArgs("Time cannot be negative".to_string()));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [minutes, seconds] => {
                let minutes = minutes
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid minutes format".to_string()))?;
                let seconds = Self::parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            [hours, minutes, seconds] => {
                let hours = hours
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid hours format".to_string()))?;
                let minutes = minutes
                    .parse::<u32>()
                    .map_err(|_| DomainError::BadArgs("Invalid minutes format".to_string()))?;
                if minutes >= 60 {
                    return Err(DomainError::BadArgs(
                        "Minutes must be less than 60".to_string(),
                    ));
                }
                let seconds = Self::parse_seconds_part(seconds)?;
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(DomainError::BadArgs(
                "Invalid time format. Supported formats: seconds (e.g., 123.45), MM:SS.ms (e.g., 2:30.5), HH:MM:SS.ms (e.g., 1:02:30.5)".to_string(),
            )),
        }
    }

    fn parse_seconds_part(part: &str) -> Result<f64, DomainError> {
        let seconds = part
            .parse::<f64>()
            .map_err(|_| DomainError::BadArgs("Invalid seconds format".to_string()))?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(DomainError::BadArgs(
                "Seconds must be between 0 and 60".to_string(),
            ));
        }
        Ok(seconds)
    }

    /// Format as `HH:MM:SS.mmm`, the seek syntax handed to ffmpeg
    pub fn to_ffmpeg_timestamp(&self) -> String {
        let total_ms = if self.seconds.is_finite() && self.seconds > 0.0 {
            (self.seconds * 1000.0).round() as u64
        } else {
            0
        };
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            hours, minutes, seconds, milliseconds
        )
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ffmpeg_timestamp())
    }
}

/// Which end of the range a value or thumbnail belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Start,
    End,
}

impl Bound {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bound::Start => "start",
            Bound::End => "end",
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scrub button direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubDirection {
    Left,
    Right,
}

/// In/out points of the loaded video.
///
/// Every mutation clamps, so `0 <= start`, `start + min_gap <= end` and
/// `end <= duration` hold after any setter. Setters hand back the stored
/// value so the caller can move its slider to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrimRange {
    duration: f64,
    start: f64,
    end: f64,
    min_gap: f64,
}

impl TrimRange {
    /// Full-length range over a probed duration
    pub fn new(duration: f64) -> Result<Self, DomainError> {
        Self::with_min_gap(duration, DEFAULT_MIN_GAP)
    }

    pub fn with_min_gap(duration: f64, min_gap: f64) -> Result<Self, DomainError> {
        if !min_gap.is_finite() || min_gap <= 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Minimum gap must be a positive number of seconds, got {}",
                min_gap
            )));
        }
        if !duration.is_finite() || duration <= min_gap {
            return Err(DomainError::UnknownDuration(format!(
                "a duration of {} s cannot hold a trim range",
                duration
            )));
        }
        Ok(Self {
            duration,
            start: 0.0,
            end: duration,
            min_gap,
        })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn min_gap(&self) -> f64 {
        self.min_gap
    }

    /// Selected length in seconds
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn get(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Start => self.start,
            Bound::End => self.end,
        }
    }

    /// Clamp to `[0, end - min_gap]`. NaN leaves the value unchanged.
    pub fn set_start(&mut self, value: f64) -> f64 {
        if !value.is_nan() {
            let upper = (self.end - self.min_gap).max(0.0);
            self.start = value.clamp(0.0, upper);
        }
        self.start
    }

    /// Clamp to `[start + min_gap, duration]`. NaN leaves the value unchanged.
    pub fn set_end(&mut self, value: f64) -> f64 {
        if !value.is_nan() {
            let lower = (self.start + self.min_gap).min(self.duration);
            self.end = value.clamp(lower, self.duration);
        }
        self.end
    }

    pub fn set(&mut self, bound: Bound, value: f64) -> f64 {
        match bound {
            Bound::Start => self.set_start(value),
            Bound::End => self.set_end(value),
        }
    }

    /// Move a bound by `increment` and route it through the matching setter
    pub fn scrub(&mut self, bound: Bound, direction: ScrubDirection, increment: f64) -> f64 {
        let current = self.get(bound);
        let proposed = match direction {
            ScrubDirection::Left => current - increment,
            ScrubDirection::Right => current + increment,
        };
        self.set(bound, proposed)
    }

    pub fn scrub_start_left(&mut self, increment: f64) -> f64 {
        self.scrub(Bound::Start, ScrubDirection::Left, increment)
    }

    pub fn scrub_start_right(&mut self, increment: f64) -> f64 {
        self.scrub(Bound::Start, ScrubDirection::Right, increment)
    }

    pub fn scrub_end_left(&mut self, increment: f64) -> f64 {
        self.scrub(Bound::End, ScrubDirection::Left, increment)
    }

    pub fn scrub_end_right(&mut self, increment: f64) -> f64 {
        self.scrub(Bound::End, ScrubDirection::Right, increment)
    }
}

/// Where the creation time of a video came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationSource {
    ContainerTag,
    FileModified,
    Unknown,
}

/// Summary of one probed stream
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamSummary {
    pub index: usize,
    pub kind: String,
    pub codec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Probed metadata of a video file
#[derive(Debug, Clone, Serialize)]
pub struct VideoMetadata {
    pub path: PathBuf,
    /// Seconds; 0.0 when the container reports nothing usable
    pub duration: f64,
    pub created: Option<DateTime<Local>>,
    pub created_source: CreationSource,
    pub size_bytes: Option<u64>,
    pub streams: Vec<StreamSummary>,
}

impl VideoMetadata {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }
}

/// Size and quality of extracted preview frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailGeometry {
    pub width: u32,
    pub height: u32,
    /// ffmpeg `-q:v` value, lower is better
    pub jpeg_quality: u8,
}

impl Default for ThumbnailGeometry {
    fn default() -> Self {
        Self {
            width: 320,
            height: 180,
            jpeg_quality: 3,
        }
    }
}

impl ThumbnailGeometry {
    /// Scale-then-crop filter producing exactly `width x height`
    pub fn filter_expression(&self) -> String {
        format!(
            "scale={w}:-1:force_original_aspect_ratio=decrease,crop={w}:{h}",
            w = self.width,
            h = self.height
        )
    }
}

/// A user's request to cut the current range out of a video
#[derive(Debug, Clone, PartialEq)]
pub struct TrimRequest {
    pub source_path: PathBuf,
    pub output_directory: PathBuf,
    pub range: TrimRange,
    pub delete_original: bool,
    /// Base name without extension; `.mp4` is appended
    pub custom_name: Option<String>,
}

impl TrimRequest {
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_directory: impl Into<PathBuf>,
        range: TrimRange,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            output_directory: output_directory.into(),
            range,
            delete_original: false,
            custom_name: None,
        }
    }

    pub fn with_delete_original(mut self, delete_original: bool) -> Self {
        self.delete_original = delete_original;
        self
    }

    pub fn with_custom_name(mut self, custom_name: Option<String>) -> Self {
        self.custom_name = custom_name;
        self
    }

    /// Length handed to the trimming tool, floored at [`MIN_TRIM_LENGTH`]
    pub fn requested_length(&self) -> f64 {
        self.range.length().max(MIN_TRIM_LENGTH)
    }
}

/// One invocation of the trimming tool
#[derive(Debug, Clone, PartialEq)]
pub struct TrimCommand {
    pub input: PathBuf,
    pub output: PathBuf,
    pub start: f64,
    pub length: f64,
}

/// Terminal result of a trim attempt
#[derive(Debug, Clone, PartialEq)]
pub enum TrimOutcome {
    Success {
        output: PathBuf,
        original_deleted: bool,
    },
    Failure {
        reason: String,
    },
    /// The clip exists but the delete/rename step did not complete
    PartialSuccess {
        output: PathBuf,
        original_deleted: bool,
        message: String,
    },
}

impl TrimOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TrimOutcome::Success { .. })
    }

    /// Where the trimmed clip currently lives, if anywhere
    pub fn output(&self) -> Option<&Path> {
        match self {
            TrimOutcome::Success { output, .. } | TrimOutcome::PartialSuccess { output, .. } => {
                Some(output)
            }
            TrimOutcome::Failure { .. } => None,
        }
    }

    /// Status line for the user
    pub fn message(&self) -> String {
        match self {
            TrimOutcome::Success {
                output,
                original_deleted,
            } => {
                let mut msg = format!("Done! Trimmed: {}", display_name(output));
                if let Some(dir) = output.parent() {
                    msg.push_str(&format!(" (in {})", dir.display()));
                }
                if *original_deleted {
                    msg.push_str(". Original deleted.");
                }
                msg
            }
            TrimOutcome::Failure { reason } => reason.clone(),
            TrimOutcome::PartialSuccess { message, .. } => message.clone(),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Lifecycle of the trim executor
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TrimState {
    #[default]
    Idle,
    Running {
        source: PathBuf,
    },
    Succeeded {
        output: PathBuf,
    },
    Failed {
        reason: String,
    },
    PartialSuccess {
        output: PathBuf,
        message: String,
    },
}

impl TrimState {
    pub fn is_running(&self) -> bool {
        matches!(self, TrimState::Running { .. })
    }

    pub fn from_outcome(outcome: &TrimOutcome) -> Self {
        match outcome {
            TrimOutcome::Success { output, .. } => TrimState::Succeeded {
                output: output.clone(),
            },
            TrimOutcome::Failure { reason } => TrimState::Failed {
                reason: reason.clone(),
            },
            TrimOutcome::PartialSuccess {
                output, message, ..
            } => TrimState::PartialSuccess {
                output: output.clone(),
                message: message.clone(),
            },
        }
    }
}

/// Persisted directory history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryState {
    #[serde(default)]
    pub last_input_directory: Option<PathBuf>,
    #[serde(default)]
    pub recent_input_directories: Vec<PathBuf>,
}

impl DirectoryState {
    /// Move `dir` to the front of the history, dropping duplicates and
    /// entries for which `is_dir` no longer holds, and keep at most `limit`.
    pub fn remember<F>(&mut self, dir: &Path, limit: usize, is_dir: F)
    where
        F: Fn(&Path) -> bool,
    {
        let dir = crate::utils::path::normalize(dir);
        let mut recent: Vec<PathBuf> = self
            .recent_input_directories
            .iter()
            .map(|p| crate::utils::path::normalize(p))
            .filter(|p| *p != dir && is_dir(p.as_path()))
            .collect();
        recent.insert(0, dir.clone());
        recent.truncate(limit.max(1));
        self.recent_input_directories = recent;
        self.last_input_directory = Some(dir);
    }

    /// Last directory, if it still exists
    pub fn last_valid<F>(&self, is_dir: F) -> Option<&Path>
    where
        F: Fn(&Path) -> bool,
    {
        self.last_input_directory
            .as_deref()
            .filter(|dir| is_dir(*dir))
    }
}

#[cfg(test)]
mod tests;
