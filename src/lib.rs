//! Trimmy video trimmer library
//!
//! Lossless video trimming around ffmpeg: a clamped in/out range model,
//! debounced thumbnail extraction on a bounded worker pool, and a trim
//! executor that stream-copies the selection and optionally replaces the
//! original.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{Bound, TrimOutcome, TrimRange, TrimRequest, TrimState, VideoMetadata};
pub use error::{TrimmyError, TrimmyResult};
