//! Fans composed notifications out to the send capability.
//!
//! Every entry is attempted independently on a bounded stream of futures;
//! one recipient's failure never blocks the others. Outcomes are collected
//! by the stream itself, so the caller gets them back only after every
//! started send has finished.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use tokio::sync::watch;

use crate::composer::{Composed, ComposedNotification};
use crate::traits::{DispatchOutcome, NotificationPayload, Notifier, NotifyError};

/// Default number of sends in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Delivers composed notifications through one [`Notifier`].
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    concurrency: usize,
    send_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            concurrency: DEFAULT_CONCURRENCY,
            send_timeout: None,
        }
    }

    /// Maximum sends in flight; clamped to at least one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Abort an individual send after `timeout`; `None` waits indefinitely.
    pub fn with_send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn channel_name(&self) -> &str {
        self.notifier.channel_name()
    }

    /// Attempt delivery of every entry in `batch`.
    ///
    /// Returns one outcome per entry that was started. When `cancel` flips to
    /// `true`, entries not yet started are dropped from the result while
    /// in-flight sends run to completion. The order of outcomes is the order
    /// of completion, not input order.
    pub async fn dispatch(
        &self,
        batch: Vec<ComposedNotification>,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Vec<DispatchOutcome> {
        let total = batch.len();
        let notifier = self.notifier.as_ref();
        let send_timeout = self.send_timeout;
        let cancel = cancel.as_ref();

        let outcomes: Vec<DispatchOutcome> = stream::iter(batch)
            .map(|entry| async move {
                if cancel.is_some_and(|rx| *rx.borrow()) {
                    tracing::debug!(recipient_id = %entry.recipient_id, "dispatch cancelled, not started");
                    return None;
                }
                Some(deliver(notifier, entry, send_timeout).await)
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|outcome| async move { outcome })
            .collect()
            .await;

        if outcomes.len() < total {
            tracing::warn!(
                started = outcomes.len(),
                total,
                "dispatch cancelled before all notifications were started"
            );
        }

        outcomes
    }
}

async fn deliver(
    notifier: &dyn Notifier,
    entry: ComposedNotification,
    send_timeout: Option<Duration>,
) -> DispatchOutcome {
    let ComposedNotification {
        recipient_id,
        composed,
    } = entry;

    let payload = match composed {
        Composed::Ready(payload) => payload,
        Composed::Skipped {
            contact_address,
            reason,
        } => {
            return DispatchOutcome {
                recipient_id,
                contact_address,
                delivered: false,
                error_detail: Some(reason),
                duration_ms: 0,
            };
        }
    };

    let start = Instant::now();
    let result = send_with_timeout(notifier, &payload, send_timeout).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => {
            tracing::info!(
                recipient_id = %recipient_id,
                channel = notifier.channel_name(),
                duration_ms,
                "Notification delivered"
            );
            DispatchOutcome {
                recipient_id,
                contact_address: payload.contact_address,
                delivered: true,
                error_detail: None,
                duration_ms,
            }
        }
        Err(e) => {
            tracing::warn!(
                recipient_id = %recipient_id,
                channel = notifier.channel_name(),
                error = %e,
                duration_ms,
                "Notification delivery failed"
            );
            DispatchOutcome {
                recipient_id,
                contact_address: payload.contact_address,
                delivered: false,
                error_detail: Some(e.to_string()),
                duration_ms,
            }
        }
    }
}

async fn send_with_timeout(
    notifier: &dyn Notifier,
    payload: &NotificationPayload,
    send_timeout: Option<Duration>,
) -> Result<(), NotifyError> {
    match send_timeout {
        Some(limit) => tokio::time::timeout(limit, notifier.send(payload))
            .await
            .unwrap_or(Err(NotifyError::Timeout(limit.as_millis() as u64))),
        None => notifier.send(payload).await,
    }
}
