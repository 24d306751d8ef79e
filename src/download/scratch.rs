//! Scratch file ownership for one request.
//!
//! Every path the extractor produces is registered here. The owner calls
//! [`ScratchFiles::cleanup`] on the way out; `Drop` removes whatever is left if the
//! request future was cancelled or panicked before that.
//!
//! Two concurrent requests for the same title share a file name and can delete each
//! other's file. That race is known and not guarded.

use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ScratchFiles {
    paths: Vec<PathBuf>,
}

impl ScratchFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a path for deletion. Duplicates are ignored.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Deletes every registered file that still exists. Returns how many were removed.
    pub async fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for path in self.paths.drain(..) {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    log::debug!("Removed scratch file {}", path.display());
                    removed += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove scratch file {}: {}", path.display(), e),
            }
        }
        removed
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in self.paths.drain(..) {
            remove_if_exists(&path);
        }
    }
}

fn remove_if_exists(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::debug!("Removed scratch file {} on drop", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove scratch file {}: {}", path.display(), e),
    }
}
