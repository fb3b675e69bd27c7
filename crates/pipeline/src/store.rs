//! Collaborator interfaces the pipeline reads from.

use wastewatch_core::{PeriodRange, Recipient, Result, WasteLogEntry};

/// Read access to raw waste measurements.
#[async_trait::async_trait]
pub trait WasteLogStore: Send + Sync {
    /// All entries recorded within `range` for recipients of `kind`.
    ///
    /// Errors are [`WasteError::Store`](wastewatch_core::WasteError::Store).
    async fn query(&self, range: &PeriodRange, kind: &str) -> Result<Vec<WasteLogEntry>>;

    /// Every entry of one recipient, newest first.
    async fn history(&self, recipient_id: &str) -> Result<Vec<WasteLogEntry>>;
}

/// Read access to the person-record store.
#[async_trait::async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// `Ok(None)` when no such recipient exists.
    async fn lookup(&self, recipient_id: &str) -> Result<Option<Recipient>>;
}
