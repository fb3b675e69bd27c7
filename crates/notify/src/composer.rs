//! Turns a classification plus the recipient record into a message payload.
//!
//! Composition never fails the batch. A recipient that could not be looked up
//! (missing, store error, no contact address) or a render error produces a
//! [`Composed::Skipped`] entry; the dispatcher reports those without calling
//! the send capability.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;
use wastewatch_core::{ClassificationResult, Recipient, WasteError};

use crate::templating::{NotificationContext, TemplateRenderer};
use crate::traits::{NotificationPayload, NotifyError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composed {
    Ready(NotificationPayload),
    Skipped {
        /// Whatever address was known, possibly empty.
        contact_address: String,
        reason: String,
    },
}

/// One composed entry per classified recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedNotification {
    pub recipient_id: String,
    pub composed: Composed,
}

#[derive(Debug)]
pub struct Composer {
    renderer: TemplateRenderer,
}

impl Composer {
    pub fn new() -> Result<Self, NotifyError> {
        Ok(Self {
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Compose the notification for one classified recipient.
    ///
    /// `lookup` is the recipient directory's answer for
    /// `result.recipient_id`: `Ok(None)` means not found.
    pub fn compose(
        &self,
        result: &ClassificationResult,
        lookup: Result<Option<Recipient>, WasteError>,
    ) -> ComposedNotification {
        let skipped = |contact_address: String, reason: String| {
            warn!(recipient_id = %result.recipient_id, reason = %reason, "notification skipped");
            ComposedNotification {
                recipient_id: result.recipient_id.clone(),
                composed: Composed::Skipped {
                    contact_address,
                    reason,
                },
            }
        };

        let recipient = match lookup {
            Ok(Some(recipient)) => recipient,
            Ok(None) => {
                return skipped(String::new(), "recipient not found in directory".to_string());
            }
            Err(e) => return skipped(String::new(), format!("recipient lookup failed: {e}")),
        };

        if !recipient.has_contact() {
            return skipped(String::new(), "recipient has no contact address".to_string());
        }

        let ctx = NotificationContext {
            display_name: recipient.display_name.clone(),
            period_label: result.period_label.clone(),
            total_waste: format_amount(result.total_waste),
            threshold: result.threshold_used.normalize().to_string(),
            fine_amount: format_amount(result.fine_amount),
            variant: result.variant,
        };

        match self.renderer.render(&ctx) {
            Ok(message) => ComposedNotification {
                recipient_id: result.recipient_id.clone(),
                composed: Composed::Ready(NotificationPayload {
                    contact_address: recipient.contact_address.trim().to_string(),
                    subject_line: message.subject,
                    body_text: message.body,
                }),
            },
            Err(e) => skipped(recipient.contact_address, e.to_string()),
        }
    }
}

/// Two decimal places, rounded the same way fines are.
fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wastewatch_core::{FinePolicy, WasteSummary};

    fn classified(total: i64, threshold: i64) -> ClassificationResult {
        let summary = WasteSummary {
            recipient_id: "21CS042".to_string(),
            total_waste: Decimal::from(total),
            period_label: "April".to_string(),
        };
        ClassificationResult::from_summary(&summary, Decimal::from(threshold), &FinePolicy::default())
            .unwrap()
    }

    fn recipient(address: &str) -> Recipient {
        Recipient {
            recipient_id: "21CS042".to_string(),
            display_name: "Asha".to_string(),
            contact_address: address.to_string(),
        }
    }

    #[test]
    fn composes_exceeded_payload() {
        let composer = Composer::new().unwrap();
        let out = composer.compose(&classified(1000, 500), Ok(Some(recipient("asha@example.com"))));

        assert_eq!(out.recipient_id, "21CS042");
        let Composed::Ready(payload) = out.composed else {
            panic!("expected ready payload");
        };
        assert_eq!(payload.contact_address, "asha@example.com");
        assert!(payload.subject_line.contains("Threshold Exceeded"));
        assert!(payload.body_text.contains("Dear Asha,"));
        assert!(payload.body_text.contains("for April is 1000.00"));
        assert!(payload.body_text.contains("threshold of 500."));
        assert!(payload.body_text.contains("₹1250.00/-"));
    }

    #[test]
    fn composes_within_limit_payload() {
        let composer = Composer::new().unwrap();
        let out = composer.compose(&classified(300, 500), Ok(Some(recipient("asha@example.com"))));
        let Composed::Ready(payload) = out.composed else {
            panic!("expected ready payload");
        };
        assert!(payload.subject_line.contains("Within Limit"));
        assert!(payload.body_text.contains("₹3000.00/-"));
    }

    #[test]
    fn amounts_round_half_away_from_zero() {
        assert_eq!(format_amount(Decimal::new(12345, 3)), "12.35");
        assert_eq!(format_amount(Decimal::new(12344, 3)), "12.34");
        assert_eq!(format_amount(Decimal::from(7)), "7.00");
    }

    #[test]
    fn missing_recipient_is_skipped() {
        let composer = Composer::new().unwrap();
        let out = composer.compose(&classified(1000, 500), Ok(None));
        assert!(matches!(
            out.composed,
            Composed::Skipped { ref reason, .. } if reason.contains("not found")
        ));
    }

    #[test]
    fn lookup_error_is_skipped() {
        let composer = Composer::new().unwrap();
        let out = composer.compose(
            &classified(1000, 500),
            Err(WasteError::store("connection reset")),
        );
        assert!(matches!(
            out.composed,
            Composed::Skipped { ref reason, .. } if reason.contains("connection reset")
        ));
    }

    #[test]
    fn blank_address_is_skipped() {
        let composer = Composer::new().unwrap();
        let out = composer.compose(&classified(1000, 500), Ok(Some(recipient(""))));
        assert!(matches!(
            out.composed,
            Composed::Skipped { ref reason, .. } if reason.contains("no contact address")
        ));
    }

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(format_amount(Decimal::new(125, 1)), "12.50");
        assert_eq!(format_amount(Decimal::from(3000)), "3000.00");
    }
}
