//! Command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use image::ImageFormat;
use tracing::{info, warn};

use crate::adapters::env_tools::locate_tool;
use crate::adapters::{JsonStateAdapter, ToolPaths};
use crate::app::library::recent_videos;
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::args::*;
use crate::config_initialization::Settings;
use crate::domain::model::*;
use crate::domain::rules::OutputNaming;
use crate::ports::StatePort;
use crate::utils::format_size;
use crate::utils::path::parent_directories;
use crate::utils::time::{format_clock, format_creation_time};

/// Settings and global options shared by every command
pub struct CommandContext {
    pub settings: Settings,
    pub state_file: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(settings: Settings, state_file: Option<PathBuf>) -> Self {
        Self {
            settings,
            state_file,
        }
    }

    pub fn state_store(&self) -> Arc<dyn StatePort> {
        match &self.state_file {
            Some(path) => Arc::new(JsonStateAdapter::new(path)),
            None => Arc::new(JsonStateAdapter::beside_executable()),
        }
    }

    /// Resolve the media tools; a missing tool ends the command
    pub fn require_tools(&self) -> Result<ToolPaths> {
        let tools = &self.settings.tools;
        ToolPaths::resolve(&tools.ffmpeg, &tools.ffprobe).map_err(|e| anyhow!(e))
    }

    pub fn container(&self) -> Result<DefaultAppContainer> {
        let tools = self.require_tools()?;
        Ok(DefaultAppContainer::new(
            &self.settings,
            &tools,
            self.state_file.clone(),
        ))
    }

    fn extensions(&self) -> &[String] {
        &self.settings.library.video_extensions
    }
}

/// Execute the check command
pub fn check(ctx: &CommandContext) -> Result<()> {
    let mut missing = Vec::new();
    for name in [&ctx.settings.tools.ffmpeg, &ctx.settings.tools.ffprobe] {
        match locate_tool(name) {
            Ok(path) => println!("{:<8} {}", name, path.display()),
            Err(_) => {
                println!("{:<8} not found", name);
                missing.push(name.clone());
            }
        }
    }
    if !missing.is_empty() {
        bail!(
            "{} not found in system PATH. Please install FFmpeg and ensure it's added to PATH",
            missing.join(", ")
        );
    }
    Ok(())
}

/// Execute the list command
pub async fn list(ctx: &CommandContext, args: ListArgs) -> Result<()> {
    let dir = match args.dir {
        Some(dir) => dir,
        None => remembered_directory(ctx).await?,
    };
    let count = args.count.unwrap_or(ctx.settings.library.recent_count);
    let videos = recent_videos(&dir, ctx.extensions(), count)?;

    if videos.is_empty() {
        println!("No videos found in {}", dir.display());
        return Ok(());
    }
    println!("Recent videos in {}:", dir.display());
    for (index, video) in videos.iter().enumerate() {
        let modified = chrono::DateTime::<chrono::Local>::from(video.modified);
        println!(
            "{:>3}. {}  ({})",
            index + 1,
            video.file_name(),
            format_creation_time(&modified)
        );
    }
    Ok(())
}

async fn remembered_directory(ctx: &CommandContext) -> Result<PathBuf> {
    let state = ctx.state_store().load_state().await;
    state
        .last_valid(|dir| dir.is_dir())
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("No directory given and no previous directory remembered"))
}

/// Execute the probe command
pub async fn probe(ctx: &CommandContext, args: ProbeArgs) -> Result<()> {
    let container = ctx.container()?;
    let metadata = container
        .probe_port()
        .probe(&args.input)
        .await
        .with_context(|| format!("Failed to probe {}", args.input.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    println!("File:     {}", metadata.file_name());
    println!("Duration: {}", format_clock(metadata.duration));
    println!(
        "Created:  {}",
        metadata
            .created
            .as_ref()
            .map(format_creation_time)
            .unwrap_or_else(|| "Unknown".to_string())
    );
    println!(
        "Size:     {}",
        metadata
            .size_bytes
            .map(format_size)
            .unwrap_or_else(|| "Unknown".to_string())
    );
    for stream in &metadata.streams {
        let mut line = format!(
            "Stream #{}: {} {}",
            stream.index,
            stream.kind,
            stream.codec.as_deref().unwrap_or("unknown")
        );
        if let (Some(w), Some(h)) = (stream.width, stream.height) {
            line.push_str(&format!(" {}x{}", w, h));
        }
        println!("{}", line);
    }
    Ok(())
}

/// Execute the thumbnail command
pub async fn thumbnail(ctx: &CommandContext, args: ThumbnailArgs) -> Result<()> {
    let at = TimeSpec::parse(&args.at)
        .map_err(|e| anyhow!("Invalid time '{}': {}", args.at, e))?
        .as_seconds();
    if !args.input.is_file() {
        bail!("Input file does not exist: {}", args.input.display());
    }

    let container = ctx.container()?;
    let (scheduler, mut events) = container.thumbnail_scheduler();
    scheduler.request_now(&args.input, Bound::Start, at);
    let event = events
        .recv()
        .await
        .ok_or_else(|| anyhow!("Thumbnail worker stopped unexpectedly"))?;

    event
        .preview
        .image()
        .save_with_format(&args.out, ImageFormat::Jpeg)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    if event.preview.is_placeholder() {
        bail!(
            "Could not extract a frame at {}; wrote a placeholder to {}",
            format_clock(at),
            args.out.display()
        );
    }
    println!("Wrote {}", args.out.display());
    Ok(())
}

/// Execute the trim command
pub async fn trim(ctx: &CommandContext, args: TrimArgs) -> Result<()> {
    if args.delete_original && !args.yes {
        bail!("--delete-original replaces the input file; pass --yes to confirm");
    }
    let start = TimeSpec::parse(&args.start)
        .map_err(|e| anyhow!("Invalid start time '{}': {}", args.start, e))?
        .as_seconds();
    let end = TimeSpec::parse(&args.end)
        .map_err(|e| anyhow!("Invalid end time '{}': {}", args.end, e))?
        .as_seconds();
    let custom_name = match args.name.as_deref() {
        Some(raw) => OutputNaming::validate_custom_name(raw)?,
        None => None,
    };

    let container = ctx.container()?;
    let metadata = container
        .probe_port()
        .probe(&args.input)
        .await
        .with_context(|| format!("Failed to probe {}", args.input.display()))?;

    let mut range = TrimRange::with_min_gap(metadata.duration, ctx.settings.trim.min_gap)?;
    let applied_start = range.set_start(start);
    let applied_end = range.set_end(end);
    if applied_start != start || applied_end != end {
        warn!(
            requested_start = start,
            requested_end = end,
            applied_start,
            applied_end,
            "Range adjusted to fit the video"
        );
    }

    let source_dir = args
        .input
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let output_directory = args.output_dir.unwrap_or_else(|| source_dir.clone());

    let request = TrimRequest::new(&args.input, output_directory, range)
        .with_delete_original(args.delete_original)
        .with_custom_name(custom_name);

    println!(
        "Trimming {} from {} to {} ({:.2}s)",
        metadata.file_name(),
        format_clock(range.start()),
        format_clock(range.end()),
        range.length()
    );
    let registry = container.registry();
    let handle = container.trim_executor().spawn(request).await?;
    let outcome = handle.await.context("Trim task was lost")?;
    registry.sweep();

    remember_input_directory(ctx, &source_dir).await;

    match outcome {
        TrimOutcome::Failure { reason } => bail!(reason),
        TrimOutcome::PartialSuccess { .. } => {
            eprintln!("{}", outcome.message());
            Ok(())
        }
        TrimOutcome::Success { .. } => {
            println!("{}", outcome.message());
            Ok(())
        }
    }
}

async fn remember_input_directory(ctx: &CommandContext, dir: &Path) {
    let store = ctx.state_store();
    let mut state = store.load_state().await;
    state.remember(dir, ctx.settings.library.recent_count, |p| p.is_dir());
    if let Err(e) = store.save_state(&state).await {
        warn!(error = %e, "Could not save directory history");
    }
}

/// Execute the dirs command
pub async fn dirs(ctx: &CommandContext, args: DirsArgs) -> Result<()> {
    let store = ctx.state_store();
    match args.action {
        DirsAction::Show => {
            let state = store.load_state().await;
            println!("State file: {}", store.state_file_path().display());
            match &state.last_input_directory {
                Some(dir) => println!("Last: {}{}", dir.display(), missing_marker(dir)),
                None => println!("Last: (none)"),
            }
            for (index, dir) in state.recent_input_directories.iter().enumerate() {
                println!("{:>3}. {}{}", index + 1, dir.display(), missing_marker(dir));
            }
        }
        DirsAction::Add { dir } => {
            if !dir.is_dir() {
                bail!("Not a directory: {}", dir.display());
            }
            let mut state = store.load_state().await;
            state.remember(&dir, ctx.settings.library.recent_count, |p| p.is_dir());
            store.save_state(&state).await?;
            info!(dir = %dir.display(), "Directory remembered");
            println!("Remembered {}", dir.display());
        }
        DirsAction::Parents { dir } => {
            let start = match dir {
                Some(dir) => dir,
                None => remembered_directory(ctx).await?,
            };
            let chain = parent_directories(&start, |p| p.is_dir());
            if chain.is_empty() {
                bail!("Not a directory: {}", start.display());
            }
            for dir in chain {
                println!("{}", dir.display());
            }
        }
    }
    Ok(())
}

fn missing_marker(dir: &Path) -> &'static str {
    if dir.is_dir() {
        ""
    } else {
        " (missing)"
    }
}
