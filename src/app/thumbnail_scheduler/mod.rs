//! Debounced thumbnail extraction
//!
//! One job slot per [`Bound`]. A new request for a bound aborts whatever
//! the slot was doing (waiting out the debounce delay, queued for a worker
//! permit, or running ffmpeg) and starts over. Aborting drops the job's
//! child process, which is spawned with `kill_on_drop`, and its temp file
//! guard. Results arrive on [`ThumbnailEvents`], which only ever yields the
//! latest generation for each bound.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use image::{ImageFormat, Rgb, RgbImage};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::app::temp_registry::{TempFileGuard, TempRegistry};
use crate::domain::errors::DomainError;
use crate::domain::model::{Bound, ThumbnailGeometry};
use crate::ports::FramePort;

/// File name prefix of extracted frames in the temp directory
pub const THUMBNAIL_PREFIX: &str = "trimmy_thumb_";

const PLACEHOLDER_GRAY: u8 = 128;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub geometry: ThumbnailGeometry,
    pub delay: Duration,
    pub max_workers: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            geometry: ThumbnailGeometry::default(),
            delay: Duration::from_millis(300),
            max_workers: num_cpus::get().clamp(1, 4),
        }
    }
}

/// What a consumer shows for a bound
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Frame(RgbImage),
    /// Flat gray image of thumbnail size, used whenever extraction fails
    Placeholder(RgbImage),
}

impl Preview {
    pub fn placeholder(geometry: ThumbnailGeometry) -> Self {
        Preview::Placeholder(RgbImage::from_pixel(
            geometry.width,
            geometry.height,
            Rgb([PLACEHOLDER_GRAY; 3]),
        ))
    }

    pub fn image(&self) -> &RgbImage {
        match self {
            Preview::Frame(image) | Preview::Placeholder(image) => image,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Preview::Placeholder(_))
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailEvent {
    pub target: Bound,
    pub requested_time: f64,
    pub generation: u64,
    pub preview: Preview,
}

/// Latest generation handed out per bound
#[derive(Debug, Default)]
struct Generations {
    counters: Mutex<[u64; 2]>,
}

impl Generations {
    fn lock(&self) -> MutexGuard<'_, [u64; 2]> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, target: Bound) -> u64 {
        let mut counters = self.lock();
        counters[slot(target)] += 1;
        counters[slot(target)]
    }

    fn is_current(&self, target: Bound, generation: u64) -> bool {
        self.lock()[slot(target)] == generation
    }
}

fn slot(target: Bound) -> usize {
    match target {
        Bound::Start => 0,
        Bound::End => 1,
    }
}

struct Shared {
    frames: Arc<dyn FramePort>,
    registry: TempRegistry,
    permits: Semaphore,
    events: mpsc::UnboundedSender<ThumbnailEvent>,
    generations: Arc<Generations>,
    config: SchedulerConfig,
    tool_missing_reported: AtomicBool,
}

impl Shared {
    async fn run_job(&self, video: PathBuf, target: Bound, time: f64, generation: u64) {
        let Ok(_permit) = self.permits.acquire().await else {
            return;
        };
        if !self.generations.is_current(target, generation) {
            return;
        }

        let preview = self.render(&video, time).await;
        let event = ThumbnailEvent {
            target,
            requested_time: time,
            generation,
            preview,
        };

        // Checked and sent under the generation lock so a newer request
        // can never slip in between.
        let counters = self.generations.lock();
        if counters[slot(target)] != generation {
            debug!(%target, generation, "Dropping superseded thumbnail");
            return;
        }
        let _ = self.events.send(event);
    }

    async fn render(&self, video: &Path, time: f64) -> Preview {
        let geometry = self.config.geometry;
        let guard = match TempFileGuard::create(&self.registry, THUMBNAIL_PREFIX, ".jpg") {
            Ok(guard) => guard,
            Err(e) => {
                warn!(error = %e, "Could not create thumbnail temp file");
                return Preview::placeholder(geometry);
            }
        };

        match self
            .frames
            .extract_frame(video, time, guard.path(), geometry)
            .await
        {
            Ok(()) => match decode_jpeg(guard.path()).await {
                Ok(image) => Preview::Frame(image),
                Err(e) => {
                    warn!(video = %video.display(), time, error = %e, "Unusable thumbnail");
                    Preview::placeholder(geometry)
                }
            },
            Err(DomainError::ToolMissing(tool)) => {
                if !self.tool_missing_reported.swap(true, Ordering::SeqCst) {
                    error!(tool = %tool, "{} not found, thumbnails disabled", tool);
                }
                Preview::placeholder(geometry)
            }
            Err(e) => {
                warn!(video = %video.display(), time, error = %e, "Thumbnail extraction failed");
                Preview::placeholder(geometry)
            }
        }
    }
}

async fn decode_jpeg(path: &Path) -> Result<RgbImage, DomainError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::OutputMissing(format!("{}: {}", path.display(), e)))?;
    if bytes.is_empty() {
        return Err(DomainError::OutputMissing(format!(
            "{} is empty",
            path.display()
        )));
    }
    image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)
        .map(|image| image.to_rgb8())
        .map_err(|e| DomainError::OutputMissing(format!("undecodable thumbnail: {}", e)))
}

/// Receiving end of the scheduler. Events queued before a newer request for
/// the same bound are skipped.
pub struct ThumbnailEvents {
    receiver: mpsc::UnboundedReceiver<ThumbnailEvent>,
    generations: Arc<Generations>,
}

impl ThumbnailEvents {
    /// Next current event; `None` once the scheduler is gone
    pub async fn recv(&mut self) -> Option<ThumbnailEvent> {
        loop {
            let event = self.receiver.recv().await?;
            if self.generations.is_current(event.target, event.generation) {
                return Some(event);
            }
        }
    }

    /// Next current event if one is ready
    pub fn try_recv(&mut self) -> Option<ThumbnailEvent> {
        while let Ok(event) = self.receiver.try_recv() {
            if self.generations.is_current(event.target, event.generation) {
                return Some(event);
            }
        }
        None
    }
}

pub struct ThumbnailScheduler {
    shared: Arc<Shared>,
    jobs: Mutex<HashMap<Bound, JoinHandle<()>>>,
}

impl ThumbnailScheduler {
    pub fn new(
        frames: Arc<dyn FramePort>,
        registry: TempRegistry,
        config: SchedulerConfig,
    ) -> (Self, ThumbnailEvents) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let generations = Arc::new(Generations::default());
        let shared = Arc::new(Shared {
            frames,
            registry,
            permits: Semaphore::new(config.max_workers.max(1)),
            events: sender,
            generations: Arc::clone(&generations),
            config,
            tool_missing_reported: AtomicBool::new(false),
        });
        let scheduler = Self {
            shared,
            jobs: Mutex::new(HashMap::new()),
        };
        (
            scheduler,
            ThumbnailEvents {
                receiver,
                generations,
            },
        )
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Debounced request: fires after the configured delay unless superseded
    pub fn schedule(&self, video: &Path, target: Bound, time: f64) -> u64 {
        self.submit(video, target, time, self.shared.config.delay)
    }

    /// Immediate request, still superseding any pending job for `target`
    pub fn request_now(&self, video: &Path, target: Bound, time: f64) -> u64 {
        self.submit(video, target, time, Duration::ZERO)
    }

    fn submit(&self, video: &Path, target: Bound, time: f64, delay: Duration) -> u64 {
        let generation = self.shared.generations.advance(target);
        let shared = Arc::clone(&self.shared);
        let video = video.to_path_buf();
        debug!(%target, time, generation, delay_ms = delay.as_millis() as u64, "Thumbnail requested");

        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            shared.run_job(video, target, time, generation).await;
        });

        if let Some(previous) = self.lock_jobs().insert(target, handle) {
            previous.abort();
        }
        generation
    }

    /// Abort the job for `target` and invalidate anything it already queued
    pub fn cancel(&self, target: Bound) {
        self.shared.generations.advance(target);
        if let Some(handle) = self.lock_jobs().remove(&target) {
            handle.abort();
        }
    }

    pub fn cancel_all(&self) {
        self.cancel(Bound::Start);
        self.cancel(Bound::End);
    }

    /// Whether a job for `target` is still waiting or running
    pub fn is_pending(&self, target: Bound) -> bool {
        self.lock_jobs()
            .get(&target)
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock_jobs(&self) -> MutexGuard<'_, HashMap<Bound, JoinHandle<()>>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ThumbnailScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.lock_jobs().drain() {
            handle.abort();
        }
    }
}
