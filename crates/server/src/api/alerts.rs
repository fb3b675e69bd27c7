//! `POST /send-waste-alerts`: run one alert batch and return its report.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use wastewatch_pipeline::{AlertRequest, BatchReport};

use crate::state::AppState;

use super::{bad_request, error_response, ApiResult};

/// Request body. The threshold may be sent as a JSON number or a string.
#[derive(Debug, Deserialize)]
pub struct SendAlertsBody {
    #[serde(default)]
    pub threshold: Option<Value>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl SendAlertsBody {
    fn into_request(self) -> ApiResult<AlertRequest> {
        let threshold = match self.threshold {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                return Err(bad_request(format!(
                    "threshold must be a number or numeric string, got {other}"
                )))
            }
        };
        Ok(AlertRequest {
            threshold,
            period: self.period,
            year: self.year,
        })
    }
}

pub async fn send_waste_alerts(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SendAlertsBody>, JsonRejection>,
) -> ApiResult<Json<BatchReport>> {
    let Json(body) = body.map_err(|e| bad_request(e.body_text()))?;
    let request = body.into_request()?;

    match state.pipeline.run(&request, Some(state.shutdown.clone())).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            warn!(error = %e, "waste alert run rejected");
            Err(error_response(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: Value) -> SendAlertsBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn numeric_threshold_becomes_text() {
        let req = body(serde_json::json!({"threshold": 500, "period": "March"}))
            .into_request()
            .unwrap();
        assert_eq!(req.threshold.as_deref(), Some("500"));
        assert_eq!(req.period.as_deref(), Some("March"));
        assert_eq!(req.year, None);
    }

    #[test]
    fn string_threshold_is_kept() {
        let req = body(serde_json::json!({"threshold": "12.5"})).into_request().unwrap();
        assert_eq!(req.threshold.as_deref(), Some("12.5"));
    }

    #[test]
    fn missing_threshold_is_left_for_validation() {
        let req = body(serde_json::json!({"period": "March"})).into_request().unwrap();
        assert!(req.threshold.is_none());
    }

    #[test]
    fn non_scalar_threshold_is_rejected() {
        let (status, _) = body(serde_json::json!({"threshold": [1]}))
            .into_request()
            .unwrap_err();
        assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    }
}
