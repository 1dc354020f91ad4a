//! Helper types for route handlers.
//!
//! Maps core errors onto the two 422 response shapes the API exposes:
//! a per-field body for validation failures and a generic
//! `{message, error}` body for everything after staging began.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use pdf_merge_core::{Error, ValidationError};

/// Route-level error, rendered as a structured 422 body.
pub enum ApiError {
    /// Malformed request body; reported before any side effects
    Validation(ValidationError),
    /// Download, merge, or publish failure; coalesced into one generic
    /// shape carrying the triggering error's description
    Merge(Error),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Merge(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self {
            Self::Validation(err) => json!({
                "message": "the given data was invalid",
                "errors": err.errors,
            }),
            Self::Merge(err) => json!({
                "message": "failed to merge PDFs",
                "error": err.to_string(),
            }),
        };

        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_error_shape() {
        let err = ApiError::Merge(Error::Merge("backend exhausted".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_validation_error_shape() {
        let mut validation = ValidationError::default();
        validation.add("urls", "at least one URL is required");

        let response = ApiError::Validation(validation).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
