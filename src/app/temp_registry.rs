//! Shared registry of temporary and intermediate files
//!
//! Every path the program creates on the side (thumbnail JPEGs, in-flight
//! trim outputs) is tracked here until it is either handed over to the user
//! or deleted. Removal from the set happens under the lock, so a path is
//! deleted at most once no matter how many owners race to clean it up.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct TempRegistry {
    paths: Arc<Mutex<HashSet<PathBuf>>>,
}

impl TempRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<PathBuf>> {
        self.paths.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking a path
    pub fn track(&self, path: &Path) {
        self.lock().insert(path.to_path_buf());
    }

    /// Stop tracking without deleting; the file now belongs to someone else
    pub fn release(&self, path: &Path) -> bool {
        self.lock().remove(path)
    }

    /// Stop tracking and delete. Returns `true` only for the call that
    /// actually claimed the path.
    pub fn discard(&self, path: &Path) -> bool {
        if !self.lock().remove(path) {
            return false;
        }
        remove_quietly(path);
        true
    }

    /// Delete everything still tracked; returns how many paths were claimed
    pub fn sweep(&self) -> usize {
        let drained: Vec<PathBuf> = self.lock().drain().collect();
        for path in &drained {
            remove_quietly(path);
        }
        if !drained.is_empty() {
            debug!(count = drained.len(), "Swept temporary files");
        }
        drained.len()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lock().contains(path)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "Removed temporary file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Could not remove temporary file"),
    }
}

/// A uniquely named file in the system temp directory, tracked by a
/// registry and discarded when the guard is dropped (including when the
/// owning task is aborted).
#[derive(Debug)]
pub struct TempFileGuard {
    path: PathBuf,
    registry: TempRegistry,
}

impl TempFileGuard {
    pub fn create(registry: &TempRegistry, prefix: &str, suffix: &str) -> std::io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile()?;
        let (_, path) = file.keep().map_err(|e| e.error)?;
        registry.track(&path);
        Ok(Self {
            path,
            registry: registry.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        self.registry.discard(&self.path);
    }
}
