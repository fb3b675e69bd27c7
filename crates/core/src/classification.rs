//! Threshold classification and fine computation.
//!
//! Each [`Variant`] owns its fine formula and the key of the template pair
//! used to render its notification, so a new variant only has to be added
//! here and to the template table.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::entity::WasteSummary;
use crate::error::{Result, WasteError};

/// Flat fine applied when a recipient stays within the threshold.
pub const DEFAULT_FINE: Decimal = Decimal::from_parts(3000, 0, 0, false, 0);

/// Surcharge percentage added on top of the total when the threshold is exceeded.
const EXCEEDED_SURCHARGE_PERCENT: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Decimal places every fine is reported with.
const FINE_SCALE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Variant {
    Exceeded,
    WithinLimit,
}

impl Variant {
    /// Pick the variant for a total. Exceedance is strictly greater-than.
    pub fn select(total_waste: Decimal, threshold: Decimal) -> Self {
        if total_waste > threshold {
            Variant::Exceeded
        } else {
            Variant::WithinLimit
        }
    }

    /// Fine owed for `total_waste` under this variant, at 2 decimal places.
    ///
    /// Fails when the surcharge does not fit in a `Decimal`.
    pub fn fine(self, total_waste: Decimal, policy: &FinePolicy) -> Result<Decimal> {
        let raw = match self {
            Variant::Exceeded => (total_waste / Decimal::ONE_HUNDRED)
                .checked_mul(EXCEEDED_SURCHARGE_PERCENT)
                .and_then(|surcharge| total_waste.checked_add(surcharge))
                .ok_or_else(|| {
                    WasteError::validation(format!(
                        "fine for total waste {total_waste} is out of range"
                    ))
                })?,
            Variant::WithinLimit => policy.default_fine,
        };
        let mut fine = raw.round_dp_with_strategy(FINE_SCALE, RoundingStrategy::MidpointAwayFromZero);
        fine.rescale(FINE_SCALE);
        Ok(fine)
    }

    /// Key of the subject/body template pair for this variant.
    pub fn template_key(self) -> &'static str {
        match self {
            Variant::Exceeded => "exceeded",
            Variant::WithinLimit => "within_limit",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Exceeded => write!(f, "EXCEEDED"),
            Variant::WithinLimit => write!(f, "WITHIN_LIMIT"),
        }
    }
}

/// Fine parameters that are fixed per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinePolicy {
    pub default_fine: Decimal,
}

impl FinePolicy {
    pub fn new(default_fine: Decimal) -> Result<Self> {
        if default_fine.is_sign_negative() && !default_fine.is_zero() {
            return Err(WasteError::validation(format!(
                "default fine must not be negative (got {})",
                default_fine
            )));
        }
        Ok(Self { default_fine })
    }
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            default_fine: DEFAULT_FINE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub recipient_id: String,
    pub total_waste: Decimal,
    pub threshold_used: Decimal,
    pub variant: Variant,
    pub fine_amount: Decimal,
    pub period_label: String,
}

impl ClassificationResult {
    /// Classify one summary. The threshold must already be validated.
    pub fn from_summary(
        summary: &WasteSummary,
        threshold: Decimal,
        policy: &FinePolicy,
    ) -> Result<Self> {
        let variant = Variant::select(summary.total_waste, threshold);
        Ok(Self {
            recipient_id: summary.recipient_id.clone(),
            total_waste: summary.total_waste,
            threshold_used: threshold,
            variant,
            fine_amount: variant.fine(summary.total_waste, policy)?,
            period_label: summary.period_label.clone(),
        })
    }
}

/// Reject negative thresholds.
pub fn validate_threshold(threshold: Decimal) -> Result<Decimal> {
    if threshold.is_sign_negative() && !threshold.is_zero() {
        return Err(WasteError::validation(format!(
            "threshold must be a non-negative number (got {})",
            threshold
        )));
    }
    Ok(threshold)
}

/// Parse a threshold from caller input (e.g. `"500"`, `" 12.5 "`).
pub fn parse_threshold(raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(WasteError::validation("threshold is required"));
    }
    let value: Decimal = raw
        .parse()
        .map_err(|_| WasteError::validation(format!("threshold '{}' is not a valid number", raw)))?;
    validate_threshold(value)
}
