//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::adapters::TomlConfigAdapter;
use crate::domain::model::{
    ThumbnailGeometry, DEFAULT_MIN_GAP, DEFAULT_SCRUB_INCREMENT, MIN_TRIM_LENGTH,
};
use crate::domain::rules::{DEFAULT_TRIM_SUFFIX, DEFAULT_VIDEO_EXTENSIONS, INVALID_NAME_CHARS};
use crate::error::{TrimmyError, TrimmyResult};
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};

/// Upper bound on the automatic thumbnail worker count
pub const MAX_AUTO_THUMBNAIL_WORKERS: usize = 4;

/// All tunables, loaded from defaults, file, environment and CLI in that order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tools: ToolSettings,
    pub thumbnails: ThumbnailSettings,
    pub trim: TrimSettings,
    pub library: LibrarySettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Name on PATH or absolute path
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub width: u32,
    pub height: u32,
    pub delay_ms: u64,
    pub jpeg_quality: u8,
    /// 0 picks `min(cpu count, 4)`
    pub max_workers: usize,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        let geometry = ThumbnailGeometry::default();
        Self {
            width: geometry.width,
            height: geometry.height,
            delay_ms: 300,
            jpeg_quality: geometry.jpeg_quality,
            max_workers: 0,
        }
    }
}

impl ThumbnailSettings {
    pub fn geometry(&self) -> ThumbnailGeometry {
        ThumbnailGeometry {
            width: self.width,
            height: self.height,
            jpeg_quality: self.jpeg_quality,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn worker_count(&self) -> usize {
        if self.max_workers > 0 {
            self.max_workers
        } else {
            num_cpus::get().clamp(1, MAX_AUTO_THUMBNAIL_WORKERS)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimSettings {
    pub suffix: String,
    pub min_gap: f64,
    pub min_trim_length: f64,
    pub scrub_increment: f64,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_TRIM_SUFFIX.to_string(),
            min_gap: DEFAULT_MIN_GAP,
            min_trim_length: MIN_TRIM_LENGTH,
            scrub_increment: DEFAULT_SCRUB_INCREMENT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    pub recent_count: usize,
    pub video_extensions: Vec<String>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            recent_count: 5,
            video_extensions: DEFAULT_VIDEO_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Settings {
    /// Reject values the rest of the program cannot work with
    pub fn validate(&self) -> TrimmyResult<()> {
        let fail = |message: String| Err(TrimmyError::ConfigError { message });

        if self.tools.ffmpeg.trim().is_empty() || self.tools.ffprobe.trim().is_empty() {
            return fail("tool paths cannot be empty".to_string());
        }
        if self.thumbnails.width == 0 || self.thumbnails.height == 0 {
            return fail(format!(
                "thumbnail size must be positive, got {}x{}",
                self.thumbnails.width, self.thumbnails.height
            ));
        }
        if !(2..=31).contains(&self.thumbnails.jpeg_quality) {
            return fail(format!(
                "thumbnail jpeg_quality must be between 2 and 31, got {}",
                self.thumbnails.jpeg_quality
            ));
        }
        if self.trim.suffix.trim().is_empty() {
            return fail("trim suffix cannot be empty".to_string());
        }
        if let Some(ch) = self.trim.suffix.chars().find(|c| INVALID_NAME_CHARS.contains(*c)) {
            return fail(format!(
                "trim suffix cannot contain '{}' (not allowed: {})",
                ch, INVALID_NAME_CHARS
            ));
        }
        for (name, value) in [
            ("min_gap", self.trim.min_gap),
            ("min_trim_length", self.trim.min_trim_length),
            ("scrub_increment", self.trim.scrub_increment),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return fail(format!("trim {} must be a positive number, got {}", name, value));
            }
        }
        if self.library.recent_count == 0 {
            return fail("library recent_count must be at least 1".to_string());
        }
        if self.library.video_extensions.is_empty() {
            return fail("library video_extensions cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

/// Settings together with the layers they were built from. Configuration is
/// loaded before the subscriber exists, so the sources are logged afterwards
/// through [`LoadedConfiguration::log_sources`].
#[derive(Debug, Clone)]
pub struct LoadedConfiguration {
    pub settings: Settings,
    pub file: Option<PathBuf>,
    pub env_overrides: Vec<&'static str>,
}

impl LoadedConfiguration {
    pub fn log_sources(&self) {
        match &self.file {
            Some(path) => info!(path = %path.display(), "Loaded configuration file"),
            None => info!("No configuration file, using defaults"),
        }
        for env_var in &self.env_overrides {
            info!(env = *env_var, "Applied environment override");
        }
        if !self.env_overrides.is_empty() {
            info!("Applied {} environment variable overrides", self.env_overrides.len());
        }
    }
}

/// Build settings with precedence CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(
    config_file: Option<&Path>,
    cli: &CliOverrides,
) -> TrimmyResult<LoadedConfiguration> {
    let file = TomlConfigAdapter::discover(config_file);
    let mut settings = match file.as_deref() {
        Some(path) => TomlConfigAdapter::load(path)?,
        None => Settings::default(),
    };

    let env_overrides = apply_environment(&mut settings, |key| std::env::var(key).ok())?;
    apply_cli_overrides(&mut settings, cli)?;
    settings.validate()?;
    Ok(LoadedConfiguration {
        settings,
        file,
        env_overrides,
    })
}

/// Environment variables and the settings they replace
pub const ENV_MAPPINGS: [(&str, &str); 5] = [
    ("TRIMMY_FFMPEG", "tools.ffmpeg"),
    ("TRIMMY_FFPROBE", "tools.ffprobe"),
    ("TRIMMY_LOG_LEVEL", "logging.level"),
    ("TRIMMY_THUMBNAIL_DELAY_MS", "thumbnails.delay_ms"),
    ("TRIMMY_SCRUB_INCREMENT", "trim.scrub_increment"),
];

/// Apply environment overrides read through `lookup`; returns the variables
/// that were applied
pub fn apply_environment<F>(settings: &mut Settings, lookup: F) -> TrimmyResult<Vec<&'static str>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();
    for (env_var, key) in ENV_MAPPINGS {
        let Some(value) = lookup(env_var) else {
            continue;
        };
        let value = value.trim().to_string();
        match key {
            "tools.ffmpeg" => settings.tools.ffmpeg = value,
            "tools.ffprobe" => settings.tools.ffprobe = value,
            "logging.level" => settings.logging.level = LogLevel::parse(&value)?,
            "thumbnails.delay_ms" => {
                settings.thumbnails.delay_ms = value.parse().map_err(|_| TrimmyError::ConfigError {
                    message: format!("{} must be a whole number of milliseconds, got '{}'", env_var, value),
                })?
            }
            "trim.scrub_increment" => {
                settings.trim.scrub_increment = value.parse().map_err(|_| TrimmyError::ConfigError {
                    message: format!("{} must be a number of seconds, got '{}'", env_var, value),
                })?
            }
            _ => continue,
        }
        applied.push(env_var);
    }
    Ok(applied)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(settings: &mut Settings, cli: &CliOverrides) -> TrimmyResult<()> {
    if let Some(level) = cli.log_level.as_deref() {
        settings.logging.level = LogLevel::parse(level)?;
    }
    if let Some(format) = cli.log_format.as_deref() {
        settings.logging.format = LogFormat::parse(format)?;
    }
    Ok(())
}
