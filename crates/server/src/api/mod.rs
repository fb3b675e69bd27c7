//! HTTP endpoints.
//!
//! Shared error types and the `WasteError` to status mapping live here.

mod alerts;
mod health;
mod history;
mod summary;

pub use alerts::send_waste_alerts;
pub use health::health;
pub use history::wastage_details;
pub use summary::waste_summary;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use wastewatch_core::WasteError;

// ── Shared types ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `{ success, data }` on success, `{ success: false, message }` otherwise.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ListResponse<T> {
    pub(crate) fn ok(data: Vec<T>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::OK,
            Json(Self {
                success: true,
                data: Some(data),
                message: None,
            }),
        )
    }

    pub(crate) fn failure(err: &WasteError) -> (StatusCode, Json<Self>) {
        (
            status_for(err),
            Json(Self {
                success: false,
                data: None,
                message: Some(err.to_string()),
            }),
        )
    }
}

pub(crate) type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

// ── Helpers ──────────────────────────────────────────────────────

/// Validation problems are the caller's fault; store problems are ours.
pub(crate) fn status_for(err: &WasteError) -> StatusCode {
    match err {
        WasteError::Validation(_) => StatusCode::BAD_REQUEST,
        WasteError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub(crate) fn error_response(err: WasteError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status_for(&err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub(crate) fn bad_request(msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: msg.into() }))
}
