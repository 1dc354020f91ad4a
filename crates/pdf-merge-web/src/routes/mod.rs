//! HTTP route handlers for the PDF merge service.
//!
//! One JSON endpoint does the work; published artifacts are served
//! statically from `main` via `ServeDir`.

mod merge;

pub use merge::merge_pdfs;

/// Liveness probe.
pub async fn healthz() -> &'static str {
    "ok"
}
