//! Merge route - accepts URLs, responds with the published artifact.

use axum::Json;
use axum::extract::State;
use std::sync::Arc;
use tracing::{error, info};

use pdf_merge_core::{MergeOutcome, MergeRequest};

use crate::helpers::ApiError;
use crate::state::AppState;

/// Merge the PDFs behind the requested URLs into one published document.
///
/// Validation failures are reported before any download starts; every
/// later failure has already torn down its staging area by the time it
/// reaches this boundary.
pub async fn merge_pdfs(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MergeRequest>,
) -> Result<Json<MergeOutcome>, ApiError> {
    request.validate()?;

    let outcome = state
        .service
        .merge_from_urls(&request)
        .await
        .map_err(|e| {
            error!("Merge request failed: {}", e);
            ApiError::from(e)
        })?;

    info!(
        "Merged {} documents into {}",
        request.urls.len(),
        outcome.filename
    );

    Ok(Json(outcome))
}
