//! Durable public storage for published artifacts.

use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{Error, Result};

/// Put/URL interface over durable, publicly addressable storage.
///
/// The service only ever writes an artifact once and computes its public
/// URL; retention of published files is an external concern.
pub trait Storage: Send + Sync {
    /// Write `bytes` at `path` (relative, `/`-separated), creating parent
    /// directories as needed.
    fn put(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Publicly resolvable URL for a stored path.
    fn public_url(&self, path: &str) -> String;
}

/// Local-disk storage rooted at a directory, served under
/// `{base_url}/storage/`.
pub struct LocalDiskStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl Storage for LocalDiskStorage {
    fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Publish(format!("{}: {e}", parent.display())))?;
        }
        fs::write(&target, bytes)
            .map_err(|e| Error::Publish(format!("{}: {e}", target.display())))?;

        debug!("Stored {} ({} bytes)", target.display(), bytes.len());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
