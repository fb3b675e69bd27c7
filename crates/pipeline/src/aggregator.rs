//! Groups waste-log entries into one summary per recipient.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::info;
use wastewatch_core::{
    validate_recipient_id, Period, PeriodRange, Result, WasteError, WasteLogEntry, WasteSummary,
};

use crate::store::WasteLogStore;

/// Query the store for `period` and sum entries per recipient.
///
/// Any store error or invalid entry fails the whole aggregation; a partial
/// aggregate is never returned.
pub async fn aggregate(
    store: &dyn WasteLogStore,
    period: &Period,
    tracked_kind: &str,
) -> Result<Vec<WasteSummary>> {
    let range = period.range()?;
    let entries = store.query(&range, tracked_kind).await?;
    let summaries = group_entries(&entries, &range, period.label())?;

    info!(
        period = %period,
        kind = tracked_kind,
        entries = entries.len(),
        recipients = summaries.len(),
        "waste logs aggregated"
    );

    Ok(summaries)
}

/// Sum `entries` per recipient, keeping only those inside `range`.
///
/// Output is sorted by recipient id; callers must not depend on that.
pub fn group_entries(
    entries: &[WasteLogEntry],
    range: &PeriodRange,
    period_label: &str,
) -> Result<Vec<WasteSummary>> {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut out_of_range = 0usize;

    for entry in entries {
        validate_recipient_id(&entry.recipient_id)?;
        if entry.amount.is_sign_negative() && !entry.amount.is_zero() {
            return Err(WasteError::validation(format!(
                "waste log for '{}' has negative amount {}",
                entry.recipient_id, entry.amount
            )));
        }
        if !range.contains(&entry.recorded_at) {
            out_of_range += 1;
            continue;
        }
        let total = totals.entry(entry.recipient_id.as_str()).or_insert(Decimal::ZERO);
        *total = total.checked_add(entry.amount).ok_or_else(|| {
            WasteError::validation(format!(
                "total waste for '{}' overflows in {}",
                entry.recipient_id, period_label
            ))
        })?;
    }

    if out_of_range > 0 {
        tracing::debug!(out_of_range, "ignored waste logs outside the period");
    }

    Ok(totals
        .into_iter()
        .map(|(recipient_id, total_waste)| WasteSummary {
            recipient_id: recipient_id.to_string(),
            total_waste,
            period_label: period_label.to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn period() -> Period {
        Period { year: 2025, month: 3 }
    }

    fn entry(id: &str, amount: Decimal, day: u32) -> WasteLogEntry {
        WasteLogEntry {
            recipient_id: id.to_string(),
            amount,
            recorded_at: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
        }
    }

    fn totals(summaries: &[WasteSummary]) -> Vec<(String, Decimal)> {
        summaries
            .iter()
            .map(|s| (s.recipient_id.clone(), s.total_waste))
            .collect()
    }

    #[test]
    fn sums_per_recipient() {
        let range = period().range().unwrap();
        let entries = vec![
            entry("a", Decimal::new(125, 1), 1),
            entry("b", Decimal::from(40), 2),
            entry("a", Decimal::new(75, 1), 3),
        ];
        let summaries = group_entries(&entries, &range, "March").unwrap();
        assert_eq!(
            totals(&summaries),
            vec![("a".to_string(), Decimal::from(20)), ("b".to_string(), Decimal::from(40))]
        );
        assert!(summaries.iter().all(|s| s.period_label == "March"));
    }

    #[test]
    fn sum_is_invariant_under_reordering() {
        let range = period().range().unwrap();
        let mut entries: Vec<_> = (1..=20)
            .map(|i| entry(if i % 3 == 0 { "x" } else { "y" }, Decimal::new(i * 37, 2), i as u32))
            .collect();
        let forward = group_entries(&entries, &range, "March").unwrap();
        entries.reverse();
        let backward = group_entries(&entries, &range, "March").unwrap();
        entries.rotate_left(7);
        let rotated = group_entries(&entries, &range, "March").unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward, rotated);
    }

    #[test]
    fn decimal_sum_is_exact() {
        let range = period().range().unwrap();
        let entries: Vec<_> = (0..10).map(|i| entry("a", Decimal::new(1, 1), i + 1)).collect();
        let summaries = group_entries(&entries, &range, "March").unwrap();
        assert_eq!(summaries[0].total_waste, Decimal::ONE);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let range = period().range().unwrap();
        assert!(group_entries(&[], &range, "March").unwrap().is_empty());
    }

    #[test]
    fn entries_outside_range_are_ignored() {
        let range = period().range().unwrap();
        let mut late = entry("a", Decimal::from(99), 1);
        late.recorded_at = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();
        let entries = vec![entry("a", Decimal::from(1), 1), late];
        let summaries = group_entries(&entries, &range, "March").unwrap();
        assert_eq!(summaries[0].total_waste, Decimal::from(1));
    }

    #[test]
    fn malformed_id_fails_whole_aggregation() {
        let range = period().range().unwrap();
        let entries = vec![entry("a", Decimal::from(1), 1), entry("bad id", Decimal::from(2), 2)];
        let err = group_entries(&entries, &range, "March").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn overflowing_total_fails_whole_aggregation() {
        let range = period().range().unwrap();
        let entries = vec![
            entry("b", Decimal::from(3), 1),
            entry("a", Decimal::MAX, 2),
            entry("a", Decimal::ONE, 3),
        ];
        let err = group_entries(&entries, &range, "March").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn negative_amount_fails_whole_aggregation() {
        let range = period().range().unwrap();
        let entries = vec![entry("a", Decimal::from(-1), 1)];
        assert!(group_entries(&entries, &range, "March").unwrap_err().is_validation());
    }
}
