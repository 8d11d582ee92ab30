//! Error-to-HTTP mapping for the web layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use uuid::Uuid;

use crate::application::errors::AppError;
use crate::presentation::models::ErrorResponse;

/// Convert an [`AppError`] into an HTTP response with the error envelope.
///
/// Every failure keeps its descriptive message; nothing is downgraded to a
/// default value (a lookup failure is a 500, never "not vulnerable").
pub fn app_error_to_response(error: AppError) -> Response {
    let (status, code) = match &error {
        AppError::Manifest(_) => (StatusCode::BAD_REQUEST, "MANIFEST_PARSE_ERROR"),
        AppError::DuplicateDependency { .. } => (StatusCode::BAD_REQUEST, "DUPLICATE_DEPENDENCY"),
        AppError::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
        AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        AppError::Lookup(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "VULNERABILITY_LOOKUP_ERROR",
        ),
        AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
    };

    tracing::error!(
        error = %error,
        http_status = %status,
        error_code = code,
        "request failed"
    );

    let body = ErrorResponse {
        code: code.to_string(),
        message: error.to_string(),
        details: None,
        request_id: Uuid::new_v4(),
        timestamp: Utc::now(),
    };

    (status, Json(body)).into_response()
}
