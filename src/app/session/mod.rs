//! Interactive trimming session
//!
//! Ties the pieces together the way a front end needs them: load a video,
//! move the bounds (which reschedules thumbnails), pick an output
//! directory, trim in the background, and remember where videos came from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::app::thumbnail_scheduler::ThumbnailScheduler;
use crate::app::trim_executor::TrimExecutor;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::OutputNaming;
use crate::ports::{ProbePort, StatePort};

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub min_gap: f64,
    pub scrub_increment: f64,
    pub recent_directories: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            min_gap: DEFAULT_MIN_GAP,
            scrub_increment: DEFAULT_SCRUB_INCREMENT,
            recent_directories: 5,
        }
    }
}

/// The video being edited and its range
#[derive(Debug, Clone)]
pub struct LoadedVideo {
    pub metadata: VideoMetadata,
    pub range: TrimRange,
}

pub struct TrimSession {
    probe: Arc<dyn ProbePort>,
    scheduler: ThumbnailScheduler,
    executor: Arc<TrimExecutor>,
    state_store: Arc<dyn StatePort>,
    options: SessionOptions,
    directories: DirectoryState,
    current: Option<LoadedVideo>,
    output_directory: Option<PathBuf>,
}

impl TrimSession {
    /// Build a session, reading persisted directory history
    pub async fn open(
        probe: Arc<dyn ProbePort>,
        scheduler: ThumbnailScheduler,
        executor: Arc<TrimExecutor>,
        state_store: Arc<dyn StatePort>,
        options: SessionOptions,
    ) -> Self {
        let directories = state_store.load_state().await;
        Self {
            probe,
            scheduler,
            executor,
            state_store,
            options,
            directories,
            current: None,
            output_directory: None,
        }
    }

    pub fn current(&self) -> Option<&LoadedVideo> {
        self.current.as_ref()
    }

    pub fn directories(&self) -> &DirectoryState {
        &self.directories
    }

    pub fn scrub_increment(&self) -> f64 {
        self.options.scrub_increment
    }

    pub fn trim_state(&self) -> watch::Receiver<TrimState> {
        self.executor.subscribe()
    }

    pub fn is_trimming(&self) -> bool {
        self.executor.is_running()
    }

    /// Directory to browse first: the last one used, if it still exists
    pub fn initial_directory(&self) -> Option<PathBuf> {
        self.directories
            .last_valid(|dir| dir.is_dir())
            .map(Path::to_path_buf)
    }

    /// Output directory in effect: the chosen one, else the video's own
    pub fn output_directory(&self) -> Option<PathBuf> {
        self.output_directory.clone().or_else(|| {
            self.current
                .as_ref()
                .and_then(|video| video.metadata.path.parent().map(Path::to_path_buf))
        })
    }

    pub fn set_output_directory(&mut self, dir: &Path) -> Result<(), DomainError> {
        if !dir.is_dir() {
            return Err(DomainError::BadArgs(format!(
                "Invalid output directory: {}",
                dir.display()
            )));
        }
        self.output_directory = Some(crate::utils::path::normalize(dir));
        Ok(())
    }

    /// Record `dir` as the latest input directory and persist the history
    pub async fn remember_directory(&mut self, dir: &Path) -> Result<(), DomainError> {
        self.directories
            .remember(dir, self.options.recent_directories, |p| p.is_dir());
        self.state_store.save_state(&self.directories).await
    }

    /// Probe and load a video; on failure the previous video stays loaded
    pub async fn load_video(&mut self, path: &Path) -> Result<&LoadedVideo, DomainError> {
        self.ensure_idle()?;
        let metadata = self.probe.probe(path).await?;
        let range = TrimRange::with_min_gap(metadata.duration, self.options.min_gap)?;

        self.scheduler.cancel_all();
        self.scheduler.request_now(path, Bound::Start, range.start());
        self.scheduler.request_now(path, Bound::End, range.end());
        info!(path = %path.display(), duration = range.duration(), "Video loaded");

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = self.remember_directory(dir).await {
                warn!(error = %e, "Could not save directory history");
            }
        }

        let video = self.current.insert(LoadedVideo { metadata, range });
        Ok(&*video)
    }

    pub fn unload(&mut self) {
        self.scheduler.cancel_all();
        self.current = None;
    }

    pub fn set_start(&mut self, value: f64) -> Result<f64, DomainError> {
        self.update(Bound::Start, |range| range.set_start(value))
    }

    pub fn set_end(&mut self, value: f64) -> Result<f64, DomainError> {
        self.update(Bound::End, |range| range.set_end(value))
    }

    pub fn scrub(&mut self, bound: Bound, direction: ScrubDirection) -> Result<f64, DomainError> {
        let increment = self.options.scrub_increment;
        self.update(bound, |range| range.scrub(bound, direction, increment))
    }

    fn update<F>(&mut self, bound: Bound, change: F) -> Result<f64, DomainError>
    where
        F: FnOnce(&mut TrimRange) -> f64,
    {
        self.ensure_idle()?;
        let video = self.current.as_mut().ok_or_else(no_video)?;
        let value = change(&mut video.range);
        self.scheduler.schedule(&video.metadata.path, bound, value);
        Ok(value)
    }

    /// Request for the current range
    pub fn build_request(
        &self,
        delete_original: bool,
        custom_name: Option<&str>,
    ) -> Result<TrimRequest, DomainError> {
        let video = self.current.as_ref().ok_or_else(no_video)?;
        let output_directory = self.output_directory().ok_or_else(|| {
            DomainError::BadArgs("No output directory selected".to_string())
        })?;
        let custom_name = match custom_name {
            Some(raw) => OutputNaming::validate_custom_name(raw)?,
            None => None,
        };
        Ok(
            TrimRequest::new(&video.metadata.path, output_directory, video.range)
                .with_delete_original(delete_original)
                .with_custom_name(custom_name),
        )
    }

    /// Start a background trim of the current range
    pub async fn start_trim(
        &self,
        delete_original: bool,
        custom_name: Option<&str>,
    ) -> Result<JoinHandle<TrimOutcome>, DomainError> {
        let request = self.build_request(delete_original, custom_name)?;
        self.executor.spawn(request).await
    }

    /// Apply a finished trim to the session: a deleted original is unloaded
    pub fn complete_trim(&mut self, outcome: &TrimOutcome) {
        let original_deleted = matches!(
            outcome,
            TrimOutcome::Success {
                original_deleted: true,
                ..
            } | TrimOutcome::PartialSuccess {
                original_deleted: true,
                ..
            }
        );
        if original_deleted {
            info!("Original deleted, unloading video");
            self.unload();
        }
        self.executor.acknowledge();
    }

    fn ensure_idle(&self) -> Result<(), DomainError> {
        if self.executor.is_running() {
            Err(DomainError::Busy(
                "wait for the running trim to finish".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

fn no_video() -> DomainError {
    DomainError::BadArgs("No video loaded".to_string())
}
