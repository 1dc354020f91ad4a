//! Per-request staging area for downloaded source PDFs.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// Ephemeral directory holding `part-{index}.pdf` files for one request.
///
/// Every request gets its own uniquely named directory, so concurrent
/// requests never share staging state. Staging roots live outside the
/// publicly served storage tree; staged source files are never
/// addressable through the file routes. The directory is removed by
/// [`StagingArea::cleanup`] on every exit path; `Drop` repeats the
/// removal as a safety net, which is harmless because cleanup is
/// idempotent.
pub struct StagingArea {
    dir: PathBuf,
    paths: Vec<PathBuf>,
    cleaned: bool,
}

impl StagingArea {
    /// Create a fresh staging directory under `root`.
    pub fn create(root: &Path, id: Uuid) -> Result<Self> {
        let dir = root.join(format!("pdf-merge-{id}"));
        fs::create_dir_all(&dir)?;
        debug!("Created staging area {}", dir.display());

        Ok(Self {
            dir,
            paths: Vec::new(),
            cleaned: false,
        })
    }

    /// Write one downloaded document as `part-{index}.pdf` (1-based) and
    /// record its path in order.
    pub fn stage(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        let path = self.dir.join(format!("part-{index}.pdf"));
        fs::write(&path, bytes)?;
        self.paths.push(path);
        Ok(())
    }

    /// Staged file paths in download order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove every staged file and the directory itself.
    ///
    /// Best-effort and idempotent: removal failures are ignored, and a
    /// second invocation is a no-op.
    pub fn cleanup(&mut self) {
        if self.cleaned {
            return;
        }
        self.cleaned = true;

        for path in &self.paths {
            let _ = fs::remove_file(path);
        }
        let _ = fs::remove_dir_all(&self.dir);
        debug!("Removed staging area {}", self.dir.display());
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stage_writes_ordered_parts() {
        let root = TempDir::new().unwrap();
        let mut staging = StagingArea::create(root.path(), Uuid::new_v4()).unwrap();

        staging.stage(1, b"first").unwrap();
        staging.stage(2, b"second").unwrap();

        let paths = staging.paths();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("part-1.pdf"));
        assert!(paths[1].ends_with("part-2.pdf"));
        assert_eq!(fs::read(&paths[0]).unwrap(), b"first");
    }

    #[test]
    fn test_cleanup_removes_directory() {
        let root = TempDir::new().unwrap();
        let mut staging = StagingArea::create(root.path(), Uuid::new_v4()).unwrap();
        staging.stage(1, b"data").unwrap();

        let dir = staging.dir().to_path_buf();
        assert!(dir.exists());
        staging.cleanup();
        assert!(!dir.exists());
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let root = TempDir::new().unwrap();
        let mut staging = StagingArea::create(root.path(), Uuid::new_v4()).unwrap();
        staging.stage(1, b"data").unwrap();

        staging.cleanup();
        // Second invocation on an already-deleted area must not panic.
        staging.cleanup();
    }

    #[test]
    fn test_unique_directories_per_request() {
        let root = TempDir::new().unwrap();
        let a = StagingArea::create(root.path(), Uuid::new_v4()).unwrap();
        let b = StagingArea::create(root.path(), Uuid::new_v4()).unwrap();
        assert_ne!(a.dir(), b.dir());
    }
}
