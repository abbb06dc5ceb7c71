//! Interactive session loop
//!
//! Reads commands from stdin while thumbnail events and trim completions
//! arrive in the background. Nothing here blocks on ffmpeg.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use image::ImageFormat;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::app::library::{recent_videos, VideoEntry};
use crate::app::session::TrimSession;
use crate::app::thumbnail_scheduler::ThumbnailEvent;
use crate::app::trim_executor::UNEXPECTED_FAILURE;
use crate::app::AppContainer;
use crate::cli::args::SessionArgs;
use crate::cli::commands::CommandContext;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::utils::time::format_clock;

const HELP: &str = "\
Commands:
  list                  show recent videos in the current directory
  load <n|file>         load a listed video by number, or a file path
  start <t> / end <t>   set a bound (seconds, MM:SS or HH:MM:SS)
  start- start+         move the start by the scrub increment
  end- end+             move the end by the scrub increment
  show                  show the loaded video and range
  outdir <dir>          choose the output directory
  trim [--delete] [name]
                        trim the range; --delete replaces the original
  help                  this text
  quit                  leave";

/// One parsed line of input
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    List,
    Load(String),
    Start(String),
    End(String),
    Scrub(Bound, ScrubDirection),
    Show,
    OutDir(PathBuf),
    Trim { delete: bool, name: Option<String> },
    Help,
    Quit,
}

impl SessionCommand {
    /// `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let required = |what: &str| {
            if rest.is_empty() {
                Err(format!("'{}' needs {}", word, what))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word.to_lowercase().as_str() {
            "list" | "ls" => SessionCommand::List,
            "load" | "open" => SessionCommand::Load(required("a number or a file")?),
            "start" => SessionCommand::Start(required("a time")?),
            "end" => SessionCommand::End(required("a time")?),
            "start-" => SessionCommand::Scrub(Bound::Start, ScrubDirection::Left),
            "start+" => SessionCommand::Scrub(Bound::Start, ScrubDirection::Right),
            "end-" => SessionCommand::Scrub(Bound::End, ScrubDirection::Left),
            "end+" => SessionCommand::Scrub(Bound::End, ScrubDirection::Right),
            "show" | "status" => SessionCommand::Show,
            "outdir" => SessionCommand::OutDir(PathBuf::from(required("a directory")?)),
            "trim" => {
                let (delete, name) = match rest.strip_prefix("--delete") {
                    Some(name) if name.is_empty() || name.starts_with(char::is_whitespace) => {
                        (true, name.trim())
                    }
                    _ => (false, rest),
                };
                SessionCommand::Trim {
                    delete,
                    name: (!name.is_empty()).then(|| name.to_string()),
                }
            }
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => {
                return Err(format!(
                    "Unknown command '{}'. Type 'help' for commands.",
                    other
                ))
            }
        };
        Ok(Some(command))
    }
}

enum Flow {
    Continue,
    Quit,
}

struct Repl<'a> {
    ctx: &'a CommandContext,
    session: TrimSession,
    browse_dir: PathBuf,
    listing: Vec<VideoEntry>,
    preview_dir: Option<PathBuf>,
    trim_task: Option<JoinHandle<TrimOutcome>>,
}

/// Execute the session command
pub async fn run(ctx: &CommandContext, args: SessionArgs) -> Result<()> {
    let container = ctx.container()?;
    let registry = container.registry();
    let (session, mut events) = container.session().await;

    if let Some(dir) = args.preview_dir.as_deref() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create preview directory {}", dir.display()))?;
    }

    let mut repl = Repl {
        ctx,
        browse_dir: PathBuf::from("."),
        session,
        listing: Vec::new(),
        preview_dir: args.preview_dir,
        trim_task: None,
    };
    repl.browse_dir = match args.dir {
        Some(dir) => {
            if let Err(e) = repl.session.remember_directory(&dir).await {
                warn!(error = %e, "Could not save directory history");
            }
            dir
        }
        None => repl
            .session
            .initial_directory()
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    println!("{}", HELP);
    repl.list();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match SessionCommand::parse(&line) {
                    Ok(Some(command)) => {
                        if let Flow::Quit = repl.handle(command).await {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => println!("{}", message),
                }
            }
            Some(event) = events.recv() => repl.show_thumbnail(event),
            joined = async {
                match repl.trim_task.as_mut() {
                    Some(handle) => handle.await,
                    None => std::future::pending().await,
                }
            } => {
                repl.trim_task = None;
                let outcome = joined.unwrap_or_else(|e| {
                    warn!(error = %e, "Trim task failed");
                    TrimOutcome::Failure { reason: UNEXPECTED_FAILURE.to_string() }
                });
                repl.finish_trim(outcome);
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    if let Some(handle) = repl.trim_task.take() {
        println!("Waiting for the running trim to finish...");
        if let Ok(outcome) = handle.await {
            repl.finish_trim(outcome);
        }
    }
    let swept = registry.sweep();
    debug!(swept, "Session closed");
    Ok(())
}

fn prompt() {
    print!("trimmy> ");
    let _ = std::io::stdout().flush();
}

impl Repl<'_> {
    async fn handle(&mut self, command: SessionCommand) -> Flow {
        let result = match command {
            SessionCommand::List => {
                self.list();
                Ok(())
            }
            SessionCommand::Load(target) => self.load(&target).await,
            SessionCommand::Start(raw) => self.set(Bound::Start, &raw),
            SessionCommand::End(raw) => self.set(Bound::End, &raw),
            SessionCommand::Scrub(bound, direction) => self
                .session
                .scrub(bound, direction)
                .map(|value| println!("{} = {}", bound, TimeSpec::from_seconds(value))),
            SessionCommand::Show => {
                self.show();
                Ok(())
            }
            SessionCommand::OutDir(dir) => self
                .session
                .set_output_directory(&dir)
                .map(|()| println!("Output directory: {}", dir.display())),
            SessionCommand::Trim { delete, name } => self.trim(delete, name.as_deref()).await,
            SessionCommand::Help => {
                println!("{}", HELP);
                Ok(())
            }
            SessionCommand::Quit => return Flow::Quit,
        };
        if let Err(e) = result {
            println!("Error: {}", e);
        }
        Flow::Continue
    }

    fn list(&mut self) {
        let settings = &self.ctx.settings.library;
        match recent_videos(&self.browse_dir, &settings.video_extensions, settings.recent_count) {
            Ok(videos) if videos.is_empty() => {
                println!("No videos in {}", self.browse_dir.display());
                self.listing.clear();
            }
            Ok(videos) => {
                println!("Recent videos in {}:", self.browse_dir.display());
                for (index, video) in videos.iter().enumerate() {
                    println!("{:>3}. {}", index + 1, video.file_name());
                }
                self.listing = videos;
            }
            Err(e) => println!("Error: {}", e),
        }
    }

    fn resolve_video(&self, target: &str) -> PathBuf {
        if let Ok(index) = target.parse::<usize>() {
            if let Some(entry) = index.checked_sub(1).and_then(|i| self.listing.get(i)) {
                return entry.path.clone();
            }
        }
        let path = PathBuf::from(target);
        if path.is_relative() && !path.exists() {
            self.browse_dir.join(path)
        } else {
            path
        }
    }

    async fn load(&mut self, target: &str) -> Result<(), DomainError> {
        let path = self.resolve_video(target);
        let video = self.session.load_video(&path).await?;
        println!(
            "Loaded {} ({})",
            video.metadata.file_name(),
            format_clock(video.range.duration())
        );
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.browse_dir = dir.to_path_buf();
        }
        Ok(())
    }

    fn set(&mut self, bound: Bound, raw: &str) -> Result<(), DomainError> {
        let requested = TimeSpec::parse(raw)?.as_seconds();
        let value = match bound {
            Bound::Start => self.session.set_start(requested)?,
            Bound::End => self.session.set_end(requested)?,
        };
        if (value - requested).abs() > f64::EPSILON {
            println!("{} = {} (adjusted)", bound, TimeSpec::from_seconds(value));
        } else {
            println!("{} = {}", bound, TimeSpec::from_seconds(value));
        }
        Ok(())
    }

    fn show(&self) {
        match self.session.current() {
            Some(video) => {
                let range = &video.range;
                println!("Video:    {}", video.metadata.path.display());
                println!("Duration: {}", format_clock(range.duration()));
                println!(
                    "Range:    {} - {} ({:.2}s)",
                    TimeSpec::from_seconds(range.start()),
                    TimeSpec::from_seconds(range.end()),
                    range.length()
                );
            }
            None => println!("No video loaded"),
        }
        if let Some(dir) = self.session.output_directory() {
            println!("Output:   {}", dir.display());
        }
        if self.session.is_trimming() {
            println!("Trim in progress...");
        }
    }

    async fn trim(
        &mut self,
        delete: bool,
        name: Option<&str>,
    ) -> Result<(), DomainError> {
        let handle = self.session.start_trim(delete, name).await?;
        self.trim_task = Some(handle);
        println!("Trimming...");
        Ok(())
    }

    fn finish_trim(&mut self, outcome: TrimOutcome) {
        println!("{}", outcome.message());
        let was_loaded = self.session.current().is_some();
        self.session.complete_trim(&outcome);
        if was_loaded && self.session.current().is_none() {
            println!("The original was deleted; load another video.");
            self.list();
        }
    }

    fn show_thumbnail(&self, event: ThumbnailEvent) {
        let label = if event.preview.is_placeholder() {
            " (placeholder)"
        } else {
            ""
        };
        match &self.preview_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.jpg", event.target));
                match event
                    .preview
                    .image()
                    .save_with_format(&path, ImageFormat::Jpeg)
                {
                    Ok(()) => println!(
                        "\n[{} preview @ {}{}] {}",
                        event.target,
                        format_clock(event.requested_time),
                        label,
                        path.display()
                    ),
                    Err(e) => warn!(path = %path.display(), error = %e, "Could not write preview"),
                }
            }
            None => println!(
                "\n[{} preview @ {}{} ready]",
                event.target,
                format_clock(event.requested_time),
                label
            ),
        }
    }
}
