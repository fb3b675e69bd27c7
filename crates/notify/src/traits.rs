//! Notifier trait definition and shared types.

use serde::Serialize;

/// Errors that can occur while rendering or delivering one notification.
///
/// These never abort a batch; the dispatcher records them per recipient.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Invalid recipient address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Delivery timed out after {0}ms")]
    Timeout(u64),
}

/// A rendered notification addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub contact_address: String,
    pub subject_line: String,
    pub body_text: String,
}

/// Send capability: delivers one payload, or reports why it couldn't.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;

    /// Human-readable name for this channel (e.g., "email", "log").
    fn channel_name(&self) -> &str;
}

/// Result of one delivery attempt for a single recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub recipient_id: String,
    /// Empty when the recipient had no usable address.
    pub contact_address: String,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub duration_ms: u64,
}
