// Domain rules - Naming and validation policies

use std::path::Path;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Characters rejected in user-supplied output names
pub const INVALID_NAME_CHARS: &str = r#"/\:*?"<>|"#;

/// Extension given to clips saved under a custom name
pub const CUSTOM_NAME_EXTENSION: &str = ".mp4";

/// Default suffix for non-destructive trims
pub const DEFAULT_TRIM_SUFFIX: &str = "_trimmy";

/// Extensions listed by default (lowercase, no dot)
pub const DEFAULT_VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "avi", "mkv", "wmv", "flv"];

/// Output file naming for trims
pub struct OutputNaming;

impl OutputNaming {
    /// Split a path's file name into stem and dotted extension (`""` if none)
    pub fn split_name(path: &Path) -> (String, String) {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let ext = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        (stem, ext)
    }

    /// Stem and extension for a non-destructive trim before collision handling
    pub fn copy_base(source: &Path, custom_name: Option<&str>, suffix: &str) -> (String, String) {
        match custom_name {
            Some(name) => (name.to_string(), CUSTOM_NAME_EXTENSION.to_string()),
            None => {
                let (stem, ext) = Self::split_name(source);
                (format!("{}{}", stem, suffix), ext)
            }
        }
    }

    /// `stem + ext` for counter 0, otherwise `stem_<counter> + ext`
    pub fn numbered(stem: &str, ext: &str, counter: u32) -> String {
        if counter == 0 {
            format!("{}{}", stem, ext)
        } else {
            format!("{}_{}{}", stem, counter, ext)
        }
    }

    /// Final name of a clip that replaces its source
    pub fn replacement_name(source: &Path, custom_name: Option<&str>) -> String {
        match custom_name {
            Some(name) => format!("{}{}", name, CUSTOM_NAME_EXTENSION),
            None => source
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "trimmed.mp4".to_string()),
        }
    }

    /// Intermediate name used while a destructive trim is in flight
    pub fn temp_trim_name(source: &Path, token: &str) -> String {
        let (stem, ext) = Self::split_name(source);
        format!("{}_temp_trim_{}{}", stem, token, ext)
    }

    /// Normalise a custom name: `None` when blank, error on invalid characters
    pub fn validate_custom_name(raw: &str) -> Result<Option<String>, DomainError> {
        let name = raw.trim();
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(ch) = name.chars().find(|c| INVALID_NAME_CHARS.contains(*c)) {
            return Err(DomainError::BadArgs(format!(
                "Invalid character '{}' in output name (not allowed: {})",
                ch, INVALID_NAME_CHARS
            )));
        }
        let name = name
            .strip_suffix(CUSTOM_NAME_EXTENSION)
            .unwrap_or(name)
            .to_string();
        if name.is_empty() {
            return Ok(None);
        }
        Ok(Some(name))
    }
}

/// Pre-dispatch checks for a trim request
pub struct TrimValidator;

impl TrimValidator {
    pub fn validate<F, D>(
        request: &TrimRequest,
        min_length: f64,
        is_file: F,
        is_dir: D,
    ) -> Result<(), DomainError>
    where
        F: Fn(&Path) -> bool,
        D: Fn(&Path) -> bool,
    {
        if !is_file(request.source_path.as_path()) {
            return Err(DomainError::FileNotFound(
                request.source_path.display().to_string(),
            ));
        }
        if !is_dir(request.output_directory.as_path()) {
            return Err(DomainError::BadArgs(format!(
                "Invalid output directory: {}",
                request.output_directory.display()
            )));
        }
        if request.range.length() + 1e-9 < min_length {
            return Err(DomainError::InvalidTimeRange(format!(
                "Trim duration too short ({:.3}s, minimum {:.3}s)",
                request.range.length(),
                min_length
            )));
        }
        if let Some(name) = request.custom_name.as_deref() {
            OutputNaming::validate_custom_name(name)?;
        }
        Ok(())
    }
}

/// Whether a path carries one of the listed video extensions
pub fn is_video_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)))
}
