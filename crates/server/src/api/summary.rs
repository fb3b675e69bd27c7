//! `GET /waste-summary/{month}`: per-recipient totals without sending.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use wastewatch_core::{Period, WasteSummary};

use crate::state::AppState;

use super::ListResponse;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub year: Option<i32>,
}

pub async fn waste_summary(
    State(state): State<Arc<AppState>>,
    Path(month): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> (StatusCode, Json<ListResponse<WasteSummary>>) {
    let period = match Period::resolve(&month, query.year, Utc::now()) {
        Ok(period) => period,
        Err(e) => return ListResponse::failure(&e),
    };

    match state.pipeline.summarize(&period).await {
        Ok(data) => ListResponse::ok(data),
        Err(e) => {
            tracing::warn!(period = %period, error = %e, "waste summary failed");
            ListResponse::failure(&e)
        }
    }
}
