//! Trim executor
//!
//! Runs one stream-copy trim at a time and publishes its lifecycle on a
//! `watch` channel:
//!
//! ```text
//! Idle -> Running -> Succeeded | Failed | PartialSuccess -> (next trim)
//! ```
//!
//! A request made while another trim is running is rejected with
//! [`DomainError::Busy`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app::temp_registry::TempRegistry;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::{OutputNaming, TrimValidator, DEFAULT_TRIM_SUFFIX};
use crate::ports::{FsPort, TrimPort};

/// Reason reported when the worker itself dies
pub const UNEXPECTED_FAILURE: &str = "An unexpected error occurred while trimming";

/// Numbered candidates tried before giving up on a free output name
pub const MAX_NAME_ATTEMPTS: u32 = 10_000;

#[derive(Debug, Clone)]
pub struct TrimOptions {
    /// Appended to the stem of non-destructive outputs
    pub suffix: String,
    pub min_trim_length: f64,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_TRIM_SUFFIX.to_string(),
            min_trim_length: MIN_TRIM_LENGTH,
        }
    }
}

pub struct TrimExecutor {
    trimmer: Arc<dyn TrimPort>,
    fs: Arc<dyn FsPort>,
    registry: TempRegistry,
    options: TrimOptions,
    state: watch::Sender<TrimState>,
}

impl TrimExecutor {
    pub fn new(
        trimmer: Arc<dyn TrimPort>,
        fs: Arc<dyn FsPort>,
        registry: TempRegistry,
        options: TrimOptions,
    ) -> Self {
        let (state, _) = watch::channel(TrimState::Idle);
        Self {
            trimmer,
            fs,
            registry,
            options,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TrimState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> TrimState {
        self.state.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().is_running()
    }

    /// Return a finished executor to `Idle`; no effect while running
    pub fn acknowledge(&self) {
        self.state.send_if_modified(|state| {
            if state.is_running() || *state == TrimState::Idle {
                false
            } else {
                *state = TrimState::Idle;
                true
            }
        });
    }

    /// Validate and run a trim on the current task
    pub async fn execute(&self, request: TrimRequest) -> Result<TrimOutcome, DomainError> {
        self.validate(&request).await?;
        self.begin(&request)?;
        let outcome = self.run(&request).await;
        self.finish(&outcome);
        Ok(outcome)
    }

    /// Validate, then run the trim on a background task. The returned handle
    /// always resolves to an outcome; a crashed worker becomes a `Failure`.
    pub async fn spawn(
        self: &Arc<Self>,
        request: TrimRequest,
    ) -> Result<JoinHandle<TrimOutcome>, DomainError> {
        self.validate(&request).await?;
        self.begin(&request)?;

        let worker = {
            let executor = Arc::clone(self);
            tokio::spawn(async move { executor.run(&request).await })
        };
        let executor = Arc::clone(self);
        Ok(tokio::spawn(async move {
            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "Trim worker failed");
                    TrimOutcome::Failure {
                        reason: UNEXPECTED_FAILURE.to_string(),
                    }
                }
            };
            executor.finish(&outcome);
            outcome
        }))
    }

    async fn validate(&self, request: &TrimRequest) -> Result<(), DomainError> {
        if self.is_running() {
            return Err(busy());
        }
        let source_exists = self
            .fs
            .file_exists(&request.source_path)
            .await
            .unwrap_or(false);
        let output_dir_exists = self
            .fs
            .directory_exists(&request.output_directory)
            .await
            .unwrap_or(false);
        TrimValidator::validate(
            request,
            self.options.min_trim_length,
            |_| source_exists,
            |_| output_dir_exists,
        )
    }

    fn begin(&self, request: &TrimRequest) -> Result<(), DomainError> {
        let mut started = false;
        self.state.send_if_modified(|state| {
            if state.is_running() {
                return false;
            }
            *state = TrimState::Running {
                source: request.source_path.clone(),
            };
            started = true;
            true
        });
        if started {
            Ok(())
        } else {
            Err(busy())
        }
    }

    fn finish(&self, outcome: &TrimOutcome) {
        match outcome {
            TrimOutcome::Success { output, .. } => {
                info!(output = %output.display(), "Trim finished")
            }
            TrimOutcome::Failure { reason } => warn!(reason = %reason, "Trim failed"),
            TrimOutcome::PartialSuccess { message, .. } => {
                warn!(message = %message, "Trim partially succeeded")
            }
        }
        self.state.send_replace(TrimState::from_outcome(outcome));
    }

    async fn run(&self, request: &TrimRequest) -> TrimOutcome {
        if request.delete_original {
            self.trim_replacing(request).await
        } else {
            self.trim_copy(request).await
        }
    }

    async fn trim_copy(&self, request: &TrimRequest) -> TrimOutcome {
        let (stem, ext) = OutputNaming::copy_base(
            &request.source_path,
            request.custom_name.as_deref(),
            &self.options.suffix,
        );
        let output = match self.free_path(&request.output_directory, &stem, &ext).await {
            Ok(output) => output,
            Err(reason) => return TrimOutcome::Failure { reason },
        };

        self.registry.track(&output);
        match self.run_tool(request, &output).await {
            Ok(()) => {
                self.registry.release(&output);
                TrimOutcome::Success {
                    output,
                    original_deleted: false,
                }
            }
            Err(reason) => {
                self.registry.discard(&output);
                TrimOutcome::Failure { reason }
            }
        }
    }

    async fn trim_replacing(&self, request: &TrimRequest) -> TrimOutcome {
        let token = Uuid::new_v4().simple().to_string();
        let temp = request
            .output_directory
            .join(OutputNaming::temp_trim_name(&request.source_path, &token));

        self.registry.track(&temp);
        if let Err(reason) = self.run_tool(request, &temp).await {
            self.registry.discard(&temp);
            return TrimOutcome::Failure { reason };
        }
        // From here on the clip at `temp` is the deliverable
        self.registry.release(&temp);

        if let Err(e) = self.fs.delete_file(&request.source_path).await {
            return TrimOutcome::PartialSuccess {
                message: format!(
                    "Trimmed clip saved as {}, but the original could not be deleted ({}). The original was kept.",
                    display_name(&temp),
                    e
                ),
                output: temp,
                original_deleted: false,
            };
        }
        info!(source = %request.source_path.display(), "Original deleted");

        let final_name =
            OutputNaming::replacement_name(&request.source_path, request.custom_name.as_deref());
        let (stem, ext) = OutputNaming::split_name(Path::new(&final_name));
        let final_path = match self.free_path(&request.output_directory, &stem, &ext).await {
            Ok(path) => path,
            Err(reason) => {
                return TrimOutcome::PartialSuccess {
                    message: format!(
                        "Original deleted, but the trimmed clip could not be renamed ({}). It was saved as {}.",
                        reason,
                        temp.display()
                    ),
                    output: temp,
                    original_deleted: true,
                }
            }
        };

        match self.fs.move_file(&temp, &final_path).await {
            Ok(()) => TrimOutcome::Success {
                output: final_path,
                original_deleted: true,
            },
            Err(e) => TrimOutcome::PartialSuccess {
                message: format!(
                    "Original deleted, but the trimmed clip could not be renamed to {} ({}). It was saved as {}.",
                    display_name(&final_path),
                    e,
                    temp.display()
                ),
                output: temp,
                original_deleted: true,
            },
        }
    }

    /// Run the tool and confirm it left a non-empty file behind
    async fn run_tool(&self, request: &TrimRequest, output: &Path) -> Result<(), String> {
        let command = TrimCommand {
            input: request.source_path.clone(),
            output: output.to_path_buf(),
            start: request.range.start(),
            length: request.requested_length(),
        };
        self.trimmer
            .trim(&command)
            .await
            .map_err(|e| format!("Trimming failed. {}", e))?;

        match self.fs.get_file_size(output).await {
            Ok(size) if size > 0 => Ok(()),
            Ok(_) => Err("Trimming failed: the output file is empty".to_string()),
            Err(_) => Err("Trimming failed: no output file was created".to_string()),
        }
    }

    /// First of `stem<ext>`, `stem_1<ext>`, `stem_2<ext>`, ... not occupied by
    /// any entry. A path that cannot be checked counts as occupied.
    async fn free_path(&self, dir: &Path, stem: &str, ext: &str) -> Result<PathBuf, String> {
        for counter in 0..MAX_NAME_ATTEMPTS {
            let candidate = dir.join(OutputNaming::numbered(stem, ext, counter));
            match self.fs.path_exists(&candidate).await {
                Ok(false) => return Ok(candidate),
                Ok(true) => {}
                Err(e) => warn!(path = %candidate.display(), error = %e, "Treating unreadable path as taken"),
            }
        }
        Err(format!(
            "No free output name for {}{} in {}",
            stem,
            ext,
            dir.display()
        ))
    }
}

fn busy() -> DomainError {
    DomainError::Busy("a trim is already running".to_string())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
