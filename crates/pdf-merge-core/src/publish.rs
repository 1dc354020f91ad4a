//! Publishing of merged artifacts to durable storage.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::storage::Storage;
use crate::util::safe_filename;

/// Successful merge response payload.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    /// Publicly resolvable URL of the merged artifact
    pub url: String,
    /// Sanitized output filename
    pub filename: String,
}

/// Source of the publish-path timestamp component.
///
/// Injected rather than read ambiently so tests can pin the value.
pub trait Clock: Send + Sync {
    /// Compact `YYYYMMDDHHMMSS` timestamp.
    fn compact_timestamp(&self) -> String;
}

/// Wall-clock UTC implementation.
pub struct SystemClock;

impl Clock for SystemClock {
    fn compact_timestamp(&self) -> String {
        Utc::now().format("%Y%m%d%H%M%S").to_string()
    }
}

/// Source of unique tokens for publish paths.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Uuid;
}

/// Random v4 UUIDs.
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Writes merged bytes to durable storage under a unique public path.
pub struct Publisher {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    public_dir: String,
}

impl Publisher {
    pub fn new(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        public_dir: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            clock,
            ids,
            public_dir: public_dir.into(),
        }
    }

    /// Store the merged bytes and compute the public URL.
    ///
    /// The path combines the public subdirectory, a timestamp, a fresh
    /// unique token, and the sanitized filename, so concurrent requests
    /// never collide and artifacts are never overwritten.
    pub fn publish(&self, merged: &[u8], requested_filename: &str) -> Result<MergeOutcome> {
        let filename = safe_filename(requested_filename);
        let path = format!(
            "{}/{}-{}-{}",
            self.public_dir,
            self.clock.compact_timestamp(),
            self.ids.generate(),
            filename
        );

        self.storage.put(&path, merged)?;
        let url = self.storage.public_url(&path);
        info!("Published merged PDF at {} ({} bytes)", path, merged.len());

        Ok(MergeOutcome { url, filename })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemoryStorage {
        files: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryStorage {
        fn new() -> Self {
            Self {
                files: Mutex::new(HashMap::new()),
            }
        }
    }

    impl Storage for MemoryStorage {
        fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
            self.files.lock().unwrap().insert(path.to_string(), bytes.to_vec());
            Ok(())
        }

        fn public_url(&self, path: &str) -> String {
            format!("http://files.test/storage/{path}")
        }
    }

    struct FixedClock;

    impl Clock for FixedClock {
        fn compact_timestamp(&self) -> String {
            "20250102030405".to_string()
        }
    }

    struct FixedIds;

    impl IdGenerator for FixedIds {
        fn generate(&self) -> Uuid {
            Uuid::nil()
        }
    }

    #[test]
    fn test_publish_path_format() {
        let storage = Arc::new(MemoryStorage::new());
        let publisher = Publisher::new(
            Arc::clone(&storage) as Arc<dyn Storage>,
            Arc::new(FixedClock),
            Arc::new(FixedIds),
            "merged",
        );

        let outcome = publisher.publish(b"%PDF-1.5", "Boleto Cliente #1.pdf").unwrap();

        assert_eq!(outcome.filename, "boleto-cliente-1.pdf");
        let expected_path = format!("merged/20250102030405-{}-boleto-cliente-1.pdf", Uuid::nil());
        assert_eq!(outcome.url, format!("http://files.test/storage/{expected_path}"));
        assert!(storage.files.lock().unwrap().contains_key(&expected_path));
    }

    #[test]
    fn test_system_clock_format() {
        let stamp = SystemClock.compact_timestamp();
        assert_eq!(stamp.len(), 14);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn put(&self, _path: &str, _bytes: &[u8]) -> Result<()> {
            Err(Error::Publish("disk full".to_string()))
        }

        fn public_url(&self, path: &str) -> String {
            format!("http://files.test/storage/{path}")
        }
    }

    #[test]
    fn test_publish_surfaces_storage_failure() {
        let publisher = Publisher::new(
            Arc::new(FailingStorage),
            Arc::new(FixedClock),
            Arc::new(FixedIds),
            "merged",
        );

        let err = publisher.publish(b"%PDF-1.5", "out.pdf").unwrap_err();
        assert!(matches!(err, Error::Publish(_)));
    }
}
