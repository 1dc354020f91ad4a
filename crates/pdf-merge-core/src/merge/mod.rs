//! Two-tier PDF merge: a fast page-tree splice with a tolerant
//! rebuild fallback.

mod page_tree;
mod rebuild;

pub use page_tree::PageTreeMerger;
pub use rebuild::RebuildMerger;

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// A PDF concatenation strategy over staged files.
///
/// Implementations start from the full ordered path list on every call;
/// no state carries over between attempts.
pub trait MergeBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Merge the staged files, in order, into one PDF byte buffer.
    fn merge(&self, inputs: &[PathBuf]) -> Result<Vec<u8>>;
}

/// Backends in preference order.
///
/// The page-tree splice keeps source objects untouched and is tried
/// first; the rebuild backend decompresses inputs and reconstructs the
/// document, which copes better with compressed object streams from
/// newer PDF revisions.
pub fn default_backends() -> Vec<Arc<dyn MergeBackend>> {
    vec![Arc::new(PageTreeMerger), Arc::new(RebuildMerger)]
}

/// Try each backend in sequence until one succeeds.
///
/// Any failure from an earlier backend, whatever its kind, moves on to
/// the next; the last error surfaces when the list is exhausted.
pub fn merge_with_fallback(
    backends: &[Arc<dyn MergeBackend>],
    inputs: &[PathBuf],
) -> Result<Vec<u8>> {
    let mut last_error = None;

    for backend in backends {
        match backend.merge(inputs) {
            Ok(bytes) => {
                if last_error.is_some() {
                    info!("Merge backend {} recovered the request", backend.name());
                }
                return Ok(bytes);
            }
            Err(e) => {
                warn!("Merge backend {} failed: {}", backend.name(), e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::Merge("no merge backends configured".to_string())))
}
