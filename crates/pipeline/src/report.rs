//! Folds dispatch outcomes into the batch report returned to the caller.

use serde::Serialize;
use wastewatch_notify::DispatchOutcome;

/// A recipient whose notification did not go out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRecipient {
    pub recipient_id: String,
    pub error_detail: String,
}

/// Terminal result of one pipeline run.
///
/// `attempted` and `delivered` are exact. `failed` is in arrival order,
/// which under concurrent dispatch is not input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: Vec<FailedRecipient>,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &DispatchOutcome) {
        self.attempted += 1;
        if outcome.delivered {
            self.delivered += 1;
        } else {
            self.failed.push(FailedRecipient {
                recipient_id: outcome.recipient_id.clone(),
                error_detail: outcome
                    .error_detail
                    .clone()
                    .unwrap_or_else(|| "delivery failed".to_string()),
            });
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

impl<'a> FromIterator<&'a DispatchOutcome> for BatchReport {
    fn from_iter<I: IntoIterator<Item = &'a DispatchOutcome>>(iter: I) -> Self {
        let mut report = BatchReport::default();
        for outcome in iter {
            report.record(outcome);
        }
        report
    }
}
