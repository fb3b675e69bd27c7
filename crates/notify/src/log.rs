//! Notifier that only logs what it would send.
//!
//! Used for dry runs, where the full pipeline should execute without any
//! mail leaving the process.

use tracing::info;

use crate::traits::{NotificationPayload, Notifier, NotifyError};

#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        info!(
            channel = "log",
            to = %payload.contact_address,
            subject = %payload.subject_line,
            body_len = payload.body_text.len(),
            "dry run: notification not sent"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let payload = NotificationPayload {
            contact_address: "a@example.com".to_string(),
            subject_line: "s".to_string(),
            body_text: "b".to_string(),
        };
        assert!(LogNotifier.send(&payload).await.is_ok());
        assert_eq!(LogNotifier.channel_name(), "log");
    }
}
