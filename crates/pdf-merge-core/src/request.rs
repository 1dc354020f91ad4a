use reqwest::Url;
use serde::Deserialize;

use crate::error::ValidationError;

/// Body of a `POST /merge-pdfs` request.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequest {
    /// Ordered list of source PDF URLs; order determines page order
    #[serde(default)]
    pub urls: Vec<String>,

    /// Requested output filename; defaults to `merged.pdf`
    #[serde(default)]
    pub filename: Option<String>,
}

impl MergeRequest {
    /// Validate the request before any fetch or staging work happens.
    ///
    /// Collects every violation rather than stopping at the first one,
    /// so the caller can report all fields at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();

        if self.urls.is_empty() {
            errors.add("urls", "at least one URL is required");
        }

        for (i, url) in self.urls.iter().enumerate() {
            if Url::parse(url).is_err() {
                errors.add(format!("urls.{i}"), "must be a valid URL");
            }
        }

        errors.into_result()
    }

    /// The output filename to use, falling back to the configured default.
    pub fn filename_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.filename.as_deref().unwrap_or(default)
    }
}
