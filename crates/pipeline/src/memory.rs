//! In-memory store implementing both collaborator traits.
//!
//! Backs tests and offline runs. It counts every query and lookup so callers
//! can assert that no store access happened, and it can be told to fail.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use wastewatch_core::{PeriodRange, Recipient, Result, WasteError, WasteLogEntry};

use crate::store::{RecipientDirectory, WasteLogStore};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// recipient_id -> (record, kind)
    recipients: RwLock<HashMap<String, (Recipient, String)>>,
    logs: RwLock<Vec<WasteLogEntry>>,
    queries: AtomicUsize,
    lookups: AtomicUsize,
    fail_queries: bool,
    fail_lookups_for: HashSet<String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipient(self, id: &str, name: &str, address: &str, kind: &str) -> Self {
        self.add_recipient(
            Recipient {
                recipient_id: id.to_string(),
                display_name: name.to_string(),
                contact_address: address.to_string(),
            },
            kind,
        );
        self
    }

    pub fn with_entry(self, id: &str, amount: Decimal, recorded_at: DateTime<Utc>) -> Self {
        self.add_entry(WasteLogEntry {
            recipient_id: id.to_string(),
            amount,
            recorded_at,
        });
        self
    }

    /// Make every waste-log query fail with a store error.
    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Make lookups of `id` fail with a store error.
    pub fn failing_lookup(mut self, id: &str) -> Self {
        self.fail_lookups_for.insert(id.to_string());
        self
    }

    // Writers recover a poisoned lock; every write is a single insert or push.
    pub fn add_recipient(&self, recipient: Recipient, kind: &str) {
        self.recipients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(recipient.recipient_id.clone(), (recipient, kind.to_string()));
    }

    pub fn add_entry(&self, entry: WasteLogEntry) {
        self.logs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Waste-log queries plus recipient lookups.
    pub fn access_count(&self) -> usize {
        self.query_count() + self.lookup_count()
    }
}

fn poisoned(what: &str) -> WasteError {
    WasteError::store(format!("in-memory {what} lock poisoned"))
}

#[async_trait::async_trait]
impl WasteLogStore for InMemoryStore {
    async fn query(&self, range: &PeriodRange, kind: &str) -> Result<Vec<WasteLogEntry>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries {
            return Err(WasteError::store("waste log store unavailable"));
        }

        let recipients = self.recipients.read().map_err(|_| poisoned("recipients"))?;
        let logs = self.logs.read().map_err(|_| poisoned("logs"))?;

        // Same shape as the SQL join: entries of unknown recipients are dropped.
        Ok(logs
            .iter()
            .filter(|e| range.contains(&e.recorded_at))
            .filter(|e| {
                recipients
                    .get(&e.recipient_id)
                    .is_some_and(|(_, k)| k == kind)
            })
            .cloned()
            .collect())
    }

    async fn history(&self, recipient_id: &str) -> Result<Vec<WasteLogEntry>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.fail_queries {
            return Err(WasteError::store("waste log store unavailable"));
        }

        let logs = self.logs.read().map_err(|_| poisoned("logs"))?;
        let mut entries: Vec<WasteLogEntry> = logs
            .iter()
            .filter(|e| e.recipient_id == recipient_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order among equal timestamps.
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl RecipientDirectory for InMemoryStore {
    async fn lookup(&self, recipient_id: &str) -> Result<Option<Recipient>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups_for.contains(recipient_id) {
            return Err(WasteError::store(format!(
                "recipient store unavailable for '{recipient_id}'"
            )));
        }
        let recipients = self.recipients.read().map_err(|_| poisoned("recipients"))?;
        Ok(recipients.get(recipient_id).map(|(r, _)| r.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wastewatch_core::Period;

    fn march() -> PeriodRange {
        Period { year: 2025, month: 3 }.range().unwrap()
    }

    #[tokio::test]
    async fn query_filters_kind_and_range() {
        let store = InMemoryStore::new()
            .with_recipient("s1", "Asha", "asha@example.com", "student")
            .with_recipient("w1", "Ravi", "ravi@example.com", "warden")
            .with_entry("s1", Decimal::from(10), Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap())
            .with_entry("s1", Decimal::from(5), Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap())
            .with_entry("w1", Decimal::from(7), Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap())
            .with_entry("nobody", Decimal::from(9), Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap());

        let entries = store.query(&march(), "student").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, Decimal::from(10));
        assert_eq!(store.query_count(), 1);
    }

    #[tokio::test]
    async fn history_is_newest_first_for_one_recipient() {
        let store = InMemoryStore::new()
            .with_recipient("s1", "Asha", "asha@example.com", "student")
            .with_entry("s1", Decimal::from(1), Utc.with_ymd_and_hms(2025, 1, 5, 8, 0, 0).unwrap())
            .with_entry("s2", Decimal::from(2), Utc.with_ymd_and_hms(2025, 2, 5, 8, 0, 0).unwrap())
            .with_entry("s1", Decimal::from(3), Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap());

        let entries = store.history("s1").await.unwrap();
        let amounts: Vec<_> = entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![Decimal::from(3), Decimal::from(1)]);
        assert!(store.history("nobody").await.unwrap().is_empty());
        assert_eq!(store.query_count(), 2);
    }

    #[test]
    fn writes_survive_a_poisoned_lock() {
        let store = InMemoryStore::new();
        let _ = std::thread::scope(|s| {
            s.spawn(|| {
                let _guard = store.logs.write().unwrap();
                panic!("writer died");
            })
            .join()
        });
        assert!(store.logs.is_poisoned());

        store.add_entry(WasteLogEntry {
            recipient_id: "s1".to_string(),
            amount: Decimal::ONE,
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap(),
        });
        let logs = store.logs.read().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(logs.len(), 1);
    }

    #[tokio::test]
    async fn lookup_counts_and_fails_on_demand() {
        let store = InMemoryStore::new()
            .with_recipient("s1", "Asha", "asha@example.com", "student")
            .failing_lookup("s2");

        assert!(store.lookup("s1").await.unwrap().is_some());
        assert!(store.lookup("zz").await.unwrap().is_none());
        assert!(store.lookup("s2").await.is_err());
        assert_eq!(store.lookup_count(), 3);
        assert_eq!(store.access_count(), 3);
    }
}
