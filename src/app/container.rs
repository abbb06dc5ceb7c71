use std::path::PathBuf;
use std::sync::Arc;

use crate::adapters::{FFmpegAdapter, FFprobeAdapter, FsLocalAdapter, JsonStateAdapter, ToolPaths};
use crate::app::session::{SessionOptions, TrimSession};
use crate::app::temp_registry::TempRegistry;
use crate::app::thumbnail_scheduler::{SchedulerConfig, ThumbnailEvents, ThumbnailScheduler};
use crate::app::trim_executor::{TrimExecutor, TrimOptions};
use crate::config_initialization::Settings;
use crate::ports::{FramePort, FsPort, ProbePort, StatePort, TrimPort};

pub trait AppContainer: Send + Sync {
    fn probe_port(&self) -> Arc<dyn ProbePort>;
    fn state_store(&self) -> Arc<dyn StatePort>;
    fn registry(&self) -> TempRegistry;
    fn trim_executor(&self) -> Arc<TrimExecutor>;
    fn thumbnail_scheduler(&self) -> (ThumbnailScheduler, ThumbnailEvents);
}

/// Port implementations a container is wired from
pub struct Ports {
    pub probe: Arc<dyn ProbePort>,
    pub frames: Arc<dyn FramePort>,
    pub trimmer: Arc<dyn TrimPort>,
    pub fs: Arc<dyn FsPort>,
    pub state: Arc<dyn StatePort>,
}

pub struct DefaultAppContainer {
    probe_port: Arc<dyn ProbePort>,
    frame_port: Arc<dyn FramePort>,
    state_store: Arc<dyn StatePort>,
    registry: TempRegistry,
    trim_executor: Arc<TrimExecutor>,
    scheduler_config: SchedulerConfig,
    session_options: SessionOptions,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg-backed adapters
    pub fn new(settings: &Settings, tools: &ToolPaths, state_file: Option<PathBuf>) -> Self {
        let ffmpeg = Arc::new(FFmpegAdapter::new(&tools.ffmpeg));
        let state: Arc<dyn StatePort> = match state_file {
            Some(path) => Arc::new(JsonStateAdapter::new(path)),
            None => Arc::new(JsonStateAdapter::beside_executable()),
        };
        Self::from_ports(
            Ports {
                probe: Arc::new(FFprobeAdapter::new(&tools.ffprobe)),
                frames: Arc::clone(&ffmpeg) as Arc<dyn FramePort>,
                trimmer: ffmpeg as Arc<dyn TrimPort>,
                fs: Arc::new(FsLocalAdapter::new()),
                state,
            },
            settings,
        )
    }

    pub fn from_ports(ports: Ports, settings: &Settings) -> Self {
        let registry = TempRegistry::new();
        let trim_executor = Arc::new(TrimExecutor::new(
            ports.trimmer,
            ports.fs,
            registry.clone(),
            TrimOptions {
                suffix: settings.trim.suffix.clone(),
                min_trim_length: settings.trim.min_trim_length,
            },
        ));

        Self {
            probe_port: ports.probe,
            frame_port: ports.frames,
            state_store: ports.state,
            registry,
            trim_executor,
            scheduler_config: SchedulerConfig {
                geometry: settings.thumbnails.geometry(),
                delay: settings.thumbnails.delay(),
                max_workers: settings.thumbnails.worker_count(),
            },
            session_options: SessionOptions {
                min_gap: settings.trim.min_gap,
                scrub_increment: settings.trim.scrub_increment,
                recent_directories: settings.library.recent_count,
            },
        }
    }

    /// A session with its own thumbnail scheduler
    pub async fn session(&self) -> (TrimSession, ThumbnailEvents) {
        let (scheduler, events) = self.thumbnail_scheduler();
        let session = TrimSession::open(
            self.probe_port(),
            scheduler,
            self.trim_executor(),
            self.state_store(),
            self.session_options.clone(),
        )
        .await;
        (session, events)
    }
}

impl AppContainer for DefaultAppContainer {
    fn probe_port(&self) -> Arc<dyn ProbePort> {
        Arc::clone(&self.probe_port)
    }

    fn state_store(&self) -> Arc<dyn StatePort> {
        Arc::clone(&self.state_store)
    }

    fn registry(&self) -> TempRegistry {
        self.registry.clone()
    }

    fn trim_executor(&self) -> Arc<TrimExecutor> {
        Arc::clone(&self.trim_executor)
    }

    fn thumbnail_scheduler(&self) -> (ThumbnailScheduler, ThumbnailEvents) {
        ThumbnailScheduler::new(
            Arc::clone(&self.frame_port),
            self.registry.clone(),
            self.scheduler_config.clone(),
        )
    }
}
