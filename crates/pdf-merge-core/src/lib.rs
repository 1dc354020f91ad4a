//! PDF Merge Core Library
//!
//! This library provides the coordination logic for merging PDFs fetched
//! from URLs:
//! - Request validation
//! - Sequential download with status/content checks
//! - Per-request staging on disk
//! - Two-tier merge (page-tree splice with rebuild fallback)
//! - Publishing to durable public storage with unconditional cleanup

pub mod config;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod publish;
pub mod request;
pub mod staging;
pub mod storage;
pub mod util;

pub use config::ServiceConfig;
pub use error::{Error, Result, ValidationError};
pub use fetch::{Fetcher, HttpFetcher};
pub use merge::{MergeBackend, PageTreeMerger, RebuildMerger, default_backends, merge_with_fallback};
pub use publish::{Clock, IdGenerator, MergeOutcome, Publisher, SystemClock, UuidV4Generator};
pub use request::MergeRequest;
pub use staging::StagingArea;
pub use storage::{LocalDiskStorage, Storage};
pub use util::safe_filename;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// High-level coordinator that owns one request end-to-end.
///
/// Collaborators (fetcher, merge backends, storage, clock, id source)
/// are injected so tests can substitute any of them.
pub struct MergeService {
    fetcher: Arc<dyn Fetcher>,
    backends: Vec<Arc<dyn MergeBackend>>,
    publisher: Publisher,
    staging_root: PathBuf,
    ids: Arc<dyn IdGenerator>,
    default_filename: String,
}

impl MergeService {
    /// Create a service with production collaborators from configuration.
    pub fn new(config: &ServiceConfig) -> Self {
        let storage: Arc<dyn Storage> = Arc::new(LocalDiskStorage::new(
            config.storage_root.clone(),
            config.public_base_url.clone(),
        ));
        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(Duration::from_secs(
            config.fetch_timeout_secs,
        )));

        Self::with_collaborators(
            fetcher,
            default_backends(),
            storage,
            Arc::new(SystemClock),
            Arc::new(UuidV4Generator),
            config,
        )
    }

    /// Create a service with explicit collaborators.
    pub fn with_collaborators(
        fetcher: Arc<dyn Fetcher>,
        backends: Vec<Arc<dyn MergeBackend>>,
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        config: &ServiceConfig,
    ) -> Self {
        let publisher = Publisher::new(storage, clock, Arc::clone(&ids), config.public_dir.clone());

        Self {
            fetcher,
            backends,
            publisher,
            staging_root: config.staging_root.clone(),
            ids,
            default_filename: config.default_filename.clone(),
        }
    }

    /// Download, merge, and publish the documents of one request.
    ///
    /// Callers validate the request first ([`MergeRequest::validate`]);
    /// this method assumes well-formed input and starts staging right
    /// away. The staging area is removed on every exit path, success or
    /// failure.
    pub async fn merge_from_urls(&self, request: &MergeRequest) -> Result<MergeOutcome> {
        let mut staging = StagingArea::create(&self.staging_root, self.ids.generate())?;
        let result = self.run(request, &mut staging).await;
        staging.cleanup();
        result
    }

    async fn run(&self, request: &MergeRequest, staging: &mut StagingArea) -> Result<MergeOutcome> {
        info!("Merging {} documents", request.urls.len());

        // Sequential and order-preserving: URL order is page order, and
        // the first failure aborts the remaining downloads.
        for (i, url) in request.urls.iter().enumerate() {
            let bytes = self.fetcher.fetch(url).await?;
            staging.stage(i + 1, &bytes)?;
        }

        // lopdf parsing is CPU-bound; keep it off the async runtime.
        let backends = self.backends.clone();
        let inputs = staging.paths().to_vec();
        let merged = tokio::task::spawn_blocking(move || merge_with_fallback(&backends, &inputs))
            .await
            .map_err(|e| Error::Merge(format!("merge task failed: {e}")))??;

        self.publisher
            .publish(&merged, request.filename_or(&self.default_filename))
    }
}
