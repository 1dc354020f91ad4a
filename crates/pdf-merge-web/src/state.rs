use pdf_merge_core::{MergeService, ServiceConfig};
use std::path::PathBuf;

/// Global application state
pub struct AppState {
    /// The merge coordinator shared by all requests
    pub service: MergeService,
    /// Storage root, also served under `/storage`
    pub storage_root: PathBuf,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            service: MergeService::new(config),
            storage_root: config.storage_root.clone(),
        }
    }
}
