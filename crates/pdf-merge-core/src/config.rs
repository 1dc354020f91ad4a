use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Root directory for published files; served publicly under `/storage`
    #[serde(default = "default_storage_root")]
    pub storage_root: PathBuf,

    /// Directory for per-request staging areas.
    ///
    /// Must stay outside `storage_root`: staged source files are private
    /// and must never be reachable through the public file routes.
    #[serde(default = "default_staging_root")]
    pub staging_root: PathBuf,

    /// Base URL prepended to published artifact paths
    /// (e.g. "http://localhost:3000")
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Subdirectory of the storage root holding published artifacts
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    /// Per-download timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Output filename used when the request omits one
    #[serde(default = "default_output_filename")]
    pub default_filename: String,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("storage")
}

fn default_staging_root() -> PathBuf {
    std::env::temp_dir()
}

fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_public_dir() -> String {
    "merged".to_string()
}

const fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_output_filename() -> String {
    "merged.pdf".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            staging_root: default_staging_root(),
            public_base_url: default_public_base_url(),
            public_dir: default_public_dir(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            default_filename: default_output_filename(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("failed to read config file {}: {e}", path.as_ref().display())
        })?;

        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
    }

    /// Load from ./config.toml when present, defaults otherwise
    pub fn load() -> Self {
        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}
