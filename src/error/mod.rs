//! Error handling module for Trimmy

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for Trimmy operations outside the domain layer
#[derive(Error, Debug)]
pub enum TrimmyError {
    /// Settings file or environment override is invalid
    #[error("Invalid configuration: {message}")]
    ConfigError { message: String },

    /// Domain-level failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

/// Result type alias for Trimmy operations
pub type TrimmyResult<T> = std::result::Result<T, TrimmyError>;
