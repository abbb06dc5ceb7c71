// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// File not found
    FileNotFound(String),
    /// External tool (ffmpeg/ffprobe) is not on PATH
    ToolMissing(String),
    /// Media probe produced no usable metadata
    ProbeFailed(String),
    /// External process exited unsuccessfully
    ProcessFailed(String),
    /// External process reported success but left no output
    OutputMissing(String),
    /// File system operation failed
    FsFail(String),
    /// Invalid time range
    InvalidTimeRange(String),
    /// Duration is zero, unknown, or too short to trim
    UnknownDuration(String),
    /// A trim is already running
    Busy(String),
    /// Internal error
    InternalError(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::FileNotFound(msg) => write!(f, "File not found: {}", msg),
            DomainError::ToolMissing(tool) => write!(
                f,
                "{} not found in system PATH. Please install FFmpeg and ensure it's added to PATH",
                tool
            ),
            DomainError::ProbeFailed(msg) => write!(f, "Probe failed: {}", msg),
            DomainError::ProcessFailed(msg) => write!(f, "Process failed: {}", msg),
            DomainError::OutputMissing(msg) => write!(f, "Output missing: {}", msg),
            DomainError::FsFail(msg) => write!(f, "File system error: {}", msg),
            DomainError::InvalidTimeRange(msg) => write!(f, "Invalid time range: {}", msg),
            DomainError::UnknownDuration(msg) => write!(f, "Unknown duration: {}", msg),
            DomainError::Busy(msg) => write!(f, "Busy: {}", msg),
            DomainError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
