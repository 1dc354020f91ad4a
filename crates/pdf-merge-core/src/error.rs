use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Unified error type for pdf-merge-core
///
/// This enum encompasses all failure cases that can occur after request
/// validation passed:
/// - Downloading source PDFs (HTTP status, transport, content checks)
/// - Merging staged files (both backends exhausted)
/// - Publishing the merged artifact to durable storage
/// - General I/O during staging
#[derive(Error, Debug)]
pub enum Error {
    /// A source URL responded with a non-success HTTP status
    #[error("failed to download PDF: {url} (HTTP {status})")]
    Download { url: String, status: u16 },

    /// The request to a source URL failed at the transport level
    /// (connection refused, DNS, timeout)
    #[error("failed to download PDF: {url} ({reason})")]
    Request { url: String, reason: String },

    /// The response declared a non-PDF content type and the body lacks
    /// the `%PDF` signature
    #[error("downloaded content is not a valid PDF: {url}")]
    ContentValidation { url: String },

    /// Every merge backend failed on the staged inputs; carries the last
    /// backend's error description
    #[error("failed to merge PDFs: {0}")]
    Merge(String),

    /// Writing the merged artifact to durable storage failed
    #[error("failed to publish merged PDF: {0}")]
    Publish(String),

    /// General I/O error (staging directory creation, part file writes)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Request validation failure, reported before any side effects.
///
/// Kept separate from [`Error`] so the HTTP layer can render the
/// per-field shape instead of the generic failure body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationError {
    /// Field name -> human-readable messages
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Promote to a `Result`, erring when any message was recorded.
    pub fn into_result(self) -> std::result::Result<(), ValidationError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
