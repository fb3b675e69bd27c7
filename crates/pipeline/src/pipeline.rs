//! End-to-end orchestration of one alert run.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::info;
use wastewatch_core::classification::parse_threshold;
use wastewatch_core::{
    validate_recipient_id, ClassificationResult, FinePolicy, Period, Result, WasteError,
    WasteLogEntry, WasteSummary,
};
use wastewatch_notify::{Composer, Dispatcher, NotifyError};

use crate::aggregator::aggregate;
use crate::classifier::classify_all;
use crate::report::BatchReport;
use crate::store::{RecipientDirectory, WasteLogStore};

/// Raw trigger input, as received from a caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertRequest {
    /// Required. Non-negative decimal, as text.
    pub threshold: Option<String>,
    /// Month name; the current month when absent.
    pub period: Option<String>,
    /// The current year when absent.
    pub year: Option<i32>,
}

/// A trigger input that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub threshold: Decimal,
    pub period: Period,
}

impl AlertRequest {
    pub fn new(threshold: impl Into<String>) -> Self {
        Self {
            threshold: Some(threshold.into()),
            ..Self::default()
        }
    }

    pub fn for_period(mut self, period: impl Into<String>) -> Self {
        self.period = Some(period.into());
        self
    }

    pub fn in_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Resolve the period and parse the threshold. Touches no store.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<ValidatedRequest> {
        let period = match self.period.as_deref() {
            Some(label) => Period::resolve(label, self.year, now)?,
            None => match self.year {
                Some(year) => Period {
                    year,
                    ..Period::containing(now)
                },
                None => Period::containing(now),
            },
        };
        period.range()?;

        let threshold = self
            .threshold
            .as_deref()
            .ok_or_else(|| WasteError::validation("threshold is required"))
            .and_then(parse_threshold)?;

        Ok(ValidatedRequest { threshold, period })
    }
}

/// Wires stores, composer and dispatcher into a single-pass run.
pub struct Pipeline {
    logs: Arc<dyn WasteLogStore>,
    directory: Arc<dyn RecipientDirectory>,
    composer: Composer,
    dispatcher: Dispatcher,
    policy: FinePolicy,
    tracked_kind: String,
}

impl Pipeline {
    pub fn new(
        logs: Arc<dyn WasteLogStore>,
        directory: Arc<dyn RecipientDirectory>,
        dispatcher: Dispatcher,
    ) -> std::result::Result<Self, NotifyError> {
        Ok(Self {
            logs,
            directory,
            composer: Composer::new()?,
            dispatcher,
            policy: FinePolicy::default(),
            tracked_kind: "student".to_string(),
        })
    }

    pub fn with_policy(mut self, policy: FinePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_tracked_kind(mut self, kind: impl Into<String>) -> Self {
        self.tracked_kind = kind.into();
        self
    }

    pub fn tracked_kind(&self) -> &str {
        &self.tracked_kind
    }

    /// Name of the channel sends go out on.
    pub fn channel_name(&self) -> &str {
        self.dispatcher.channel_name()
    }

    /// Aggregate only: one summary per recipient for `period`.
    pub async fn summarize(&self, period: &Period) -> Result<Vec<WasteSummary>> {
        aggregate(self.logs.as_ref(), period, &self.tracked_kind).await
    }

    /// Raw log history of one recipient, newest first.
    ///
    /// The id is validated before the store is touched.
    pub async fn history(&self, recipient_id: &str) -> Result<Vec<WasteLogEntry>> {
        validate_recipient_id(recipient_id)?;
        let entries = self.logs.history(recipient_id).await?;
        tracing::debug!(recipient_id, entries = entries.len(), "waste log history read");
        Ok(entries)
    }

    /// Aggregate and classify, without sending anything.
    pub async fn classify(&self, request: &ValidatedRequest) -> Result<Vec<ClassificationResult>> {
        let summaries = self.summarize(&request.period).await?;
        classify_all(&summaries, request.threshold, &self.policy)
    }

    /// Run the whole pipeline for one trigger.
    ///
    /// `Err` means the run failed before any send was attempted. `Ok` carries
    /// the report, which may itself list per-recipient failures.
    pub async fn run(
        &self,
        request: &AlertRequest,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<BatchReport> {
        let validated = request.validate(Utc::now())?;
        self.run_validated(&validated, cancel).await
    }

    pub async fn run_validated(
        &self,
        request: &ValidatedRequest,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<BatchReport> {
        info!(
            period = %request.period,
            threshold = %request.threshold,
            channel = self.dispatcher.channel_name(),
            "waste alert run started"
        );

        let classified = self.classify(request).await?;
        if classified.is_empty() {
            info!(period = %request.period, "no waste logs for period, nothing to send");
            return Ok(BatchReport::default());
        }

        let mut batch = Vec::with_capacity(classified.len());
        for result in &classified {
            let lookup = self.directory.lookup(&result.recipient_id).await;
            batch.push(self.composer.compose(result, lookup));
        }

        let outcomes = self.dispatcher.dispatch(batch, cancel).await;
        let report: BatchReport = outcomes.iter().collect();

        info!(
            period = %request.period,
            attempted = report.attempted,
            delivered = report.delivered,
            failed = report.failed_count(),
            "waste alert run finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 3, 9, 0, 0).unwrap()
    }

    #[test]
    fn validate_full_request() {
        let req = AlertRequest::new("500").for_period("March").in_year(2024);
        let v = req.validate(now()).unwrap();
        assert_eq!(v.threshold, Decimal::from(500));
        assert_eq!(v.period, Period { year: 2024, month: 3 });
    }

    #[test]
    fn missing_period_means_current_month() {
        let v = AlertRequest::new("1").validate(now()).unwrap();
        assert_eq!(v.period, Period { year: 2025, month: 7 });

        let v = AlertRequest::new("1").in_year(2023).validate(now()).unwrap();
        assert_eq!(v.period, Period { year: 2023, month: 7 });
    }

    #[test]
    fn missing_threshold_is_rejected() {
        let req = AlertRequest {
            period: Some("March".to_string()),
            ..AlertRequest::default()
        };
        assert!(req.validate(now()).unwrap_err().is_validation());
    }

    #[test]
    fn bad_period_is_reported_before_threshold() {
        let req = AlertRequest::new("-1").for_period("Smarch");
        let err = req.validate(now()).unwrap_err();
        assert!(err.to_string().contains("Smarch"));
    }
}
