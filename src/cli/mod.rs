//! CLI module for Trimmy
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;
pub mod repl;

pub use args::*;

use crate::config_initialization::CliOverrides;

/// Trimmy video trimmer
///
/// Pick a recent video, set in and out points with live thumbnails, and
/// trim it losslessly with ffmpeg stream copy.
#[derive(Parser, Debug)]
#[command(name = "trimmy")]
#[command(about = "Trimmy - quick lossless video trimming")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory history file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            log_level: self.log_level.clone(),
            log_format: self.log_format.clone(),
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that ffmpeg and ffprobe are available
    Check,
    /// List the most recently modified videos in a directory
    List(ListArgs),
    /// Show video metadata
    Probe(ProbeArgs),
    /// Extract one preview frame
    Thumbnail(ThumbnailArgs),
    /// Trim a video without re-encoding
    Trim(TrimArgs),
    /// Inspect and update the directory history
    Dirs(DirsArgs),
    /// Interactive trimming session
    Session(SessionArgs),
}
