//! `GET /wastage-details/{recipient_id}`: one recipient's raw log history.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use wastewatch_core::WasteLogEntry;

use crate::state::AppState;

use super::ListResponse;

pub async fn wastage_details(
    State(state): State<Arc<AppState>>,
    Path(recipient_id): Path<String>,
) -> (StatusCode, Json<ListResponse<WasteLogEntry>>) {
    match state.pipeline.history(&recipient_id).await {
        Ok(entries) => ListResponse::ok(entries),
        Err(e) => {
            tracing::warn!(recipient_id = %recipient_id, error = %e, "wastage details failed");
            ListResponse::failure(&e)
        }
    }
}
