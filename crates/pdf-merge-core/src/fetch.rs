//! Source PDF download with status and content validation.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Accept header sent with every source download.
const ACCEPT_PDF: &str = "application/pdf,*/*";

/// Leading bytes of every well-formed PDF.
const PDF_SIGNATURE: &[u8] = b"%PDF";

/// Trait for resolving a source URL to raw PDF bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download one source document, validating status and content.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Production fetcher backed by reqwest.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("Downloading {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT_PDF)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", url, e);
                Error::Request {
                    url: url.to_string(),
                    reason: if e.is_timeout() { "timed out".to_string() } else { e.to_string() },
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes().await.map_err(|e| Error::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        // A declared non-PDF content type is tolerated only when the body
        // still carries the PDF signature. A missing header skips the check
        // entirely and leaves bad content for the merge step to reject.
        if let Some(content_type) = content_type
            && !content_type.to_lowercase().contains("pdf")
            && !body.starts_with(PDF_SIGNATURE)
        {
            return Err(Error::ContentValidation {
                url: url.to_string(),
            });
        }

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{headers, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_fetch_sends_accept_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc.pdf"))
            .and(headers("accept", ACCEPT_PDF.split(',').collect::<Vec<_>>()))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.5".to_vec(), "application/pdf"))
            .mount(&server)
            .await;

        let body = fetcher().fetch(&format!("{}/doc.pdf", server.uri())).await.unwrap();
        assert_eq!(body, b"%PDF-1.5");
    }

    #[tokio::test]
    async fn test_fetch_fails_on_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher().fetch(&format!("{}/missing.pdf", server.uri())).await.unwrap_err();
        match err {
            Error::Download { status, .. } => assert_eq!(status, 404),
            other => panic!("expected Download error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_html_without_signature() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"<html>nope</html>".to_vec(), "text/html"))
            .mount(&server)
            .await;

        let err = fetcher().fetch(&format!("{}/page", server.uri())).await.unwrap_err();
        assert!(matches!(err, Error::ContentValidation { .. }));
    }

    #[tokio::test]
    async fn test_fetch_accepts_pdf_signature_despite_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/octet"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 data".to_vec(), "application/octet-stream"),
            )
            .mount(&server)
            .await;

        let body = fetcher().fetch(&format!("{}/octet", server.uri())).await.unwrap();
        assert!(body.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_fetch_skips_check_without_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bare"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a pdf".to_vec()))
            .mount(&server)
            .await;

        // No Content-Type header: the textual check is bypassed and bad
        // content is only caught at merge time.
        let body = fetcher().fetch(&format!("{}/bare", server.uri())).await.unwrap();
        assert_eq!(body, b"not a pdf");
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(250))
                    .set_body_bytes(b"%PDF-1.5".to_vec()),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_millis(50));
        let err = fetcher.fetch(&format!("{}/slow", server.uri())).await.unwrap_err();
        assert!(matches!(err, Error::Request { .. }));
    }
}
