use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WasteError};

/// Longest recipient id accepted from the stores.
pub const MAX_RECIPIENT_ID_LEN: usize = 64;

/// A single raw waste measurement, as written by the ingestion path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteLogEntry {
    pub recipient_id: String,
    pub amount: Decimal,
    pub recorded_at: DateTime<Utc>,
}

/// Total waste for one recipient over one reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteSummary {
    pub recipient_id: String,
    pub total_waste: Decimal,
    pub period_label: String,
}

/// A tracked person, as returned by the recipient directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub recipient_id: String,
    pub display_name: String,
    pub contact_address: String,
}

impl Recipient {
    pub fn has_contact(&self) -> bool {
        !self.contact_address.trim().is_empty()
    }
}

/// Check that a recipient id is non-empty, at most
/// [`MAX_RECIPIENT_ID_LEN`] characters, and made of `[A-Za-z0-9_.-]`.
pub fn validate_recipient_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(WasteError::validation("recipient id must not be empty"));
    }
    if id.chars().count() > MAX_RECIPIENT_ID_LEN {
        return Err(WasteError::validation(format!(
            "recipient id '{}' exceeds {} characters",
            id, MAX_RECIPIENT_ID_LEN
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(WasteError::validation(format!(
            "recipient id '{}' contains invalid characters",
            id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_ids() {
        assert!(validate_recipient_id("21CS042").is_ok());
        assert!(validate_recipient_id("roll-7_b.2").is_ok());
        assert!(validate_recipient_id("").is_err());
        assert!(validate_recipient_id("has space").is_err());
        assert!(validate_recipient_id("drop;table").is_err());
        assert!(validate_recipient_id(&"x".repeat(65)).is_err());
        assert!(validate_recipient_id(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = WasteSummary {
            recipient_id: "21CS042".to_string(),
            total_waste: Decimal::new(12550, 2),
            period_label: "March".to_string(),
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["recipientId"], "21CS042");
        assert_eq!(json["totalWaste"], "125.50");
        assert_eq!(json["periodLabel"], "March");
    }

    #[test]
    fn blank_contact_is_missing() {
        let recipient = Recipient {
            recipient_id: "a".to_string(),
            display_name: "A".to_string(),
            contact_address: "   ".to_string(),
        };
        assert!(!recipient.has_contact());
    }
}
