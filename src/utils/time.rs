//! Time formatting for status lines and metadata display

use chrono::{DateTime, Local};

/// Format seconds as `HH:MM:SS`, truncating fractions.
/// Negative, NaN and infinite inputs render as `00:00:00`.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00:00".to_string();
    }
    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Format a creation timestamp the way the file list shows it
pub fn format_creation_time(time: &DateTime<Local>) -> String {
    time.format("%m/%d/%y %H:%M").to_string()
}
