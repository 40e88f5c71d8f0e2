//! Partial output tracking.
//!
//! An annotated video is only valid once its container trailer is written.
//! Until then the file is "pending": dropped guards and Ctrl+C both remove it
//! so no truncated video is left behind.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// RAII guard for an output file that is still being written.
pub struct PendingOutput {
    path: PathBuf,
    committed: bool,
}

impl PendingOutput {
    /// Start tracking `path`. Nothing is created on disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        register_pending(&path);
        Self {
            path,
            committed: false,
        }
    }

    /// Path being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mark the output complete and keep it on disk.
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        unregister_pending(&self.path);
        std::mem::take(&mut self.path)
    }
}

impl Drop for PendingOutput {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if fs::remove_file(&self.path).is_ok() {
            debug!(path = %self.path.display(), "removed partial output");
        }
        unregister_pending(&self.path);
    }
}

/// Outputs still being written, removed on signal.
static PENDING_OUTPUTS: std::sync::LazyLock<std::sync::Mutex<Vec<PathBuf>>> =
    std::sync::LazyLock::new(|| std::sync::Mutex::new(Vec::new()));

fn register_pending(path: &Path) {
    if let Ok(mut pending) = PENDING_OUTPUTS.lock() {
        pending.push(path.to_path_buf());
    }
}

fn unregister_pending(path: &Path) {
    if let Ok(mut pending) = PENDING_OUTPUTS.lock() {
        pending.retain(|p| p != path);
    }
}

/// Remove every output still pending. Called from the Ctrl+C handler.
pub fn cleanup_pending_outputs() {
    if let Ok(pending) = PENDING_OUTPUTS.lock() {
        for path in pending.iter() {
            let _ = fs::remove_file(path);
        }
    }
}
