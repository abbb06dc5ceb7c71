//! Test doubles shared by the integration tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use image::{ImageFormat, Rgb, RgbImage};

use trimmy::adapters::FsLocalAdapter;
use trimmy::app::{DefaultAppContainer, Ports};
use trimmy::config_initialization::Settings;
use trimmy::domain::errors::DomainError;
use trimmy::domain::model::*;
use trimmy::ports::*;

/// What the fake trimming tool does when invoked
#[derive(Clone, Copy, Debug)]
pub enum TrimBehaviour {
    /// Write a small file at the output path
    Write,
    /// Exit non-zero
    Fail,
    /// Exit zero without producing anything
    NoOutput,
    /// Panic inside the worker
    Panic,
}

pub struct FakeTrimmer {
    behaviour: TrimBehaviour,
    latency: Duration,
    pub commands: Mutex<Vec<TrimCommand>>,
}

impl FakeTrimmer {
    pub fn new(behaviour: TrimBehaviour) -> Arc<Self> {
        Self::slow(behaviour, Duration::ZERO)
    }

    pub fn slow(behaviour: TrimBehaviour, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            latency,
            commands: Mutex::new(Vec::new()),
        })
    }

    pub fn commands(&self) -> Vec<TrimCommand> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrimPort for FakeTrimmer {
    async fn trim(&self, command: &TrimCommand) -> Result<(), DomainError> {
        self.commands.lock().unwrap().push(command.clone());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.behaviour {
            TrimBehaviour::Write => {
                std::fs::write(&command.output, b"trimmed clip").unwrap();
                Ok(())
            }
            TrimBehaviour::Fail => {
                // Leave a partial file behind like a real crash would
                std::fs::write(&command.output, b"partial").unwrap();
                Err(DomainError::ProcessFailed(
                    "ffmpeg exited with code 1: Invalid data found when processing input".to_string(),
                ))
            }
            TrimBehaviour::NoOutput => Ok(()),
            TrimBehaviour::Panic => panic!("trimmer exploded"),
        }
    }
}

/// Real local file system with switchable delete/rename failures
#[derive(Default)]
pub struct FlakyFs {
    inner: FsLocalAdapter,
    pub fail_delete: AtomicBool,
    pub fail_move: AtomicBool,
    /// Paths whose existence check errors out
    pub unreadable: Mutex<Vec<PathBuf>>,
}

impl FlakyFs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_delete() -> Arc<Self> {
        let fs = Self::default();
        fs.fail_delete.store(true, Ordering::SeqCst);
        Arc::new(fs)
    }

    pub fn failing_move() -> Arc<Self> {
        let fs = Self::default();
        fs.fail_move.store(true, Ordering::SeqCst);
        Arc::new(fs)
    }

    pub fn unreadable(paths: &[PathBuf]) -> Arc<Self> {
        let fs = Self::default();
        *fs.unreadable.lock().unwrap() = paths.to_vec();
        Arc::new(fs)
    }
}

#[async_trait]
impl FsPort for FlakyFs {
    async fn file_exists(&self, file_path: &Path) -> Result<bool, DomainError> {
        self.inner.file_exists(file_path).await
    }

    async fn path_exists(&self, path: &Path) -> Result<bool, DomainError> {
        if self.unreadable.lock().unwrap().iter().any(|p| p == path) {
            return Err(DomainError::FsFail("Permission denied".to_string()));
        }
        self.inner.path_exists(path).await
    }

    async fn directory_exists(&self, dir_path: &Path) -> Result<bool, DomainError> {
        self.inner.directory_exists(dir_path).await
    }

    async fn get_file_size(&self, file_path: &Path) -> Result<u64, DomainError> {
        self.inner.get_file_size(file_path).await
    }

    async fn delete_file(&self, file_path: &Path) -> Result<(), DomainError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(DomainError::FsFail("Access is denied".to_string()));
        }
        self.inner.delete_file(file_path).await
    }

    async fn move_file(&self, from: &Path, to: &Path) -> Result<(), DomainError> {
        if self.fail_move.load(Ordering::SeqCst) {
            return Err(DomainError::FsFail("Access is denied".to_string()));
        }
        self.inner.move_file(from, to).await
    }
}

/// Probe reporting a fixed duration for any existing file
pub struct FakeProbe {
    pub duration: f64,
}

#[async_trait]
impl ProbePort for FakeProbe {
    async fn probe(&self, file_path: &Path) -> Result<VideoMetadata, DomainError> {
        if !file_path.is_file() {
            return Err(DomainError::FileNotFound(file_path.display().to_string()));
        }
        Ok(VideoMetadata {
            path: file_path.to_path_buf(),
            duration: self.duration,
            created: None,
            created_source: CreationSource::Unknown,
            size_bytes: Some(12),
            streams: Vec::new(),
        })
    }
}

/// Frame extractor writing a solid-colour JPEG
pub struct FakeFrames;

#[async_trait]
impl FramePort for FakeFrames {
    async fn extract_frame(
        &self,
        _video: &Path,
        _at_seconds: f64,
        output: &Path,
        geometry: ThumbnailGeometry,
    ) -> Result<(), DomainError> {
        RgbImage::from_pixel(geometry.width, geometry.height, Rgb([10, 120, 200]))
            .save_with_format(output, ImageFormat::Jpeg)
            .map_err(|e| DomainError::InternalError(e.to_string()))
    }
}

/// In-memory directory history
#[derive(Default)]
pub struct MemoryState {
    pub state: Mutex<DirectoryState>,
    pub saves: Mutex<usize>,
    path: PathBuf,
}

impl MemoryState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            path: PathBuf::from("memory.json"),
            ..Default::default()
        })
    }
}

#[async_trait]
impl StatePort for MemoryState {
    async fn load_state(&self) -> DirectoryState {
        self.state.lock().unwrap().clone()
    }

    async fn save_state(&self, state: &DirectoryState) -> Result<(), DomainError> {
        *self.state.lock().unwrap() = state.clone();
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    fn state_file_path(&self) -> &Path {
        &self.path
    }
}

/// Settings with a short debounce so tests stay quick
pub fn fast_settings() -> Settings {
    let mut settings = Settings::default();
    settings.thumbnails.delay_ms = 20;
    settings.thumbnails.max_workers = 2;
    settings
}

pub fn container(
    duration: f64,
    trimmer: Arc<FakeTrimmer>,
    fs: Arc<FlakyFs>,
    state: Arc<MemoryState>,
) -> DefaultAppContainer {
    DefaultAppContainer::from_ports(
        Ports {
            probe: Arc::new(FakeProbe { duration }),
            frames: Arc::new(FakeFrames),
            trimmer,
            fs,
            state,
        },
        &fast_settings(),
    )
}

/// Create a fake source video and return its path
pub fn write_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"original video").unwrap();
    path
}

/// Sorted file names in a directory
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Range over a 120 s video
pub fn range(start: f64, end: f64) -> TrimRange {
    let mut range = TrimRange::new(120.0).unwrap();
    range.set_start(start);
    range.set_end(end);
    range
}
