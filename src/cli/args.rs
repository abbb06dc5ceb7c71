//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Directory to list (default: last used directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Number of videos to show
    #[arg(long)]
    pub count: Option<usize>,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the thumbnail command
#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Frame time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(long)]
    pub at: String,

    /// Where to write the JPEG
    #[arg(long)]
    pub out: PathBuf,
}

/// Arguments for the trim command
#[derive(Args, Debug)]
pub struct TrimArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Start time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub start: String,

    /// End time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub end: String,

    /// Output directory (default: the input's directory)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Output name without extension; `.mp4` is appended
    #[arg(long)]
    pub name: Option<String>,

    /// Replace the original with the trimmed clip
    #[arg(long)]
    pub delete_original: bool,

    /// Confirm --delete-original
    #[arg(long)]
    pub yes: bool,
}

/// Arguments for the dirs command
#[derive(Args, Debug)]
pub struct DirsArgs {
    #[command(subcommand)]
    pub action: DirsAction,
}

#[derive(Subcommand, Debug)]
pub enum DirsAction {
    /// Show the last and recent input directories
    Show,
    /// Record a directory as the latest input directory
    Add {
        dir: PathBuf,
    },
    /// List a directory and each of its parents up to the root
    Parents {
        /// Starting directory (default: last used directory)
        dir: Option<PathBuf>,
    },
}

/// Arguments for the session command
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Directory to browse (default: last used directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Write start.jpg / end.jpg previews here as they arrive
    #[arg(long)]
    pub preview_dir: Option<PathBuf>,
}
