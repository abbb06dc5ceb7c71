//! Path helpers for directory navigation

use std::path::{Component, Path, PathBuf};

/// Lexically normalise a path: drop `.` components and resolve `..`
/// against preceding normal components. Does not touch the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) && normalized.pop();
                if !popped && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// `path` (or its parent when it is not a directory) followed by every
/// existing ancestor up to the root
pub fn parent_directories<F>(path: &Path, is_dir: F) -> Vec<PathBuf>
where
    F: Fn(&Path) -> bool,
{
    let mut current = normalize(path);
    if !is_dir(current.as_path()) {
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return Vec::new(),
        }
    }

    let mut chain = Vec::new();
    if current.as_os_str().is_empty() || !is_dir(current.as_path()) {
        return chain;
    }
    chain.push(current.clone());
    while let Some(parent) = current.parent() {
        if parent.as_os_str().is_empty() || !is_dir(parent) {
            break;
        }
        chain.push(parent.to_path_buf());
        current = parent.to_path_buf();
    }
    chain
}

/// Directory holding the running executable, falling back to the working directory
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
