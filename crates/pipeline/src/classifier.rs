//! Applies the per-run threshold to every summary.

use rust_decimal::Decimal;
use tracing::info;
use wastewatch_core::classification::validate_threshold;
use wastewatch_core::{ClassificationResult, FinePolicy, Result, Variant, WasteSummary};

/// Classify each summary against `threshold`.
///
/// A negative threshold is rejected before anything is classified.
pub fn classify_all(
    summaries: &[WasteSummary],
    threshold: Decimal,
    policy: &FinePolicy,
) -> Result<Vec<ClassificationResult>> {
    let threshold = validate_threshold(threshold)?;

    let results: Vec<ClassificationResult> = summaries
        .iter()
        .map(|s| ClassificationResult::from_summary(s, threshold, policy))
        .collect::<Result<_>>()?;

    let exceeded = results
        .iter()
        .filter(|r| r.variant == Variant::Exceeded)
        .count();
    info!(
        threshold = %threshold,
        classified = results.len(),
        exceeded,
        within_limit = results.len() - exceeded,
        "summaries classified"
    );

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, total: i64) -> WasteSummary {
        WasteSummary {
            recipient_id: id.to_string(),
            total_waste: Decimal::from(total),
            period_label: "May".to_string(),
        }
    }

    #[test]
    fn classifies_each_summary() {
        let summaries = vec![summary("a", 1000), summary("b", 300), summary("c", 500)];
        let results = classify_all(&summaries, Decimal::from(500), &FinePolicy::default()).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].variant, Variant::Exceeded);
        assert_eq!(results[0].fine_amount.to_string(), "1250.00");
        assert_eq!(results[1].variant, Variant::WithinLimit);
        assert_eq!(results[1].fine_amount.to_string(), "3000.00");
        assert_eq!(results[2].variant, Variant::WithinLimit);
        assert!(results.iter().all(|r| r.threshold_used == Decimal::from(500)));
    }

    #[test]
    fn negative_threshold_rejected() {
        let err = classify_all(&[summary("a", 1)], Decimal::from(-5), &FinePolicy::default())
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(classify_all(&[], Decimal::ZERO, &FinePolicy::default())
            .unwrap()
            .is_empty());
    }
}
