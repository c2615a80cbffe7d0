//! Storage accessor seam.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::errors::{MigrationError, Result};
use crate::entity::StorageRecord;
use crate::validation::DEFAULT_MAX_BATCH_SIZE;

/// Batch writer for the single table.
///
/// `batch_put` upserts by `(PK, SK)` and is all-or-nothing per call.
#[async_trait]
pub trait StorageAccessor: Send + Sync {
    async fn batch_put(&self, records: &[StorageRecord]) -> Result<()>;
}

/// In-memory table keyed by `(PK, SK)`
#[derive(Debug)]
pub struct MemoryAccessor {
    items: Mutex<BTreeMap<(String, String), StorageRecord>>,
    max_batch: usize,
    calls: AtomicUsize,
}

impl Default for MemoryAccessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAccessor {
    pub fn new() -> Self {
        Self::with_max_batch(DEFAULT_MAX_BATCH_SIZE)
    }

    pub fn with_max_batch(max_batch: usize) -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            max_batch,
            calls: AtomicUsize::new(0),
        }
    }

    fn items(&self) -> std::sync::MutexGuard<'_, BTreeMap<(String, String), StorageRecord>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn get(&self, pk: &str, sk: &str) -> Option<StorageRecord> {
        self.items().get(&(pk.to_string(), sk.to_string())).cloned()
    }

    /// Every stored record ordered by `(PK, SK)`
    pub fn records(&self) -> Vec<StorageRecord> {
        self.items().values().cloned().collect()
    }

    /// Number of accepted `batch_put` calls
    pub fn batch_calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl StorageAccessor for MemoryAccessor {
    async fn batch_put(&self, records: &[StorageRecord]) -> Result<()> {
        let entity_type = records
            .first()
            .map(|r| r.entity_type.as_str())
            .unwrap_or("unknown");
        if records.is_empty() {
            return Err(MigrationError::write(entity_type, "Batch cannot be empty"));
        }
        if records.len() > self.max_batch {
            return Err(MigrationError::write(
                entity_type,
                format!("Batch size cannot exceed {}", self.max_batch),
            ));
        }

        let mut items = self.items();
        for record in records {
            items.insert((record.pk.clone(), record.sk.clone()), record.clone());
        }
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: usize) -> StorageRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        StorageRecord::new(format!("USER#u{}", id), "PROFILE", "USER", at)
    }

    #[tokio::test]
    async fn test_upsert_by_primary_key() {
        let storage = MemoryAccessor::new();
        storage.batch_put(&[record(1), record(2)]).await.unwrap();

        let mut updated = record(1);
        updated.version = 2;
        storage.batch_put(&[updated]).await.unwrap();

        assert_eq!(storage.len(), 2);
        assert_eq!(storage.get("USER#u1", "PROFILE").unwrap().version, 2);
        assert_eq!(storage.batch_calls(), 2);
    }

    #[tokio::test]
    async fn test_rejects_empty_and_oversized_batches() {
        let storage = MemoryAccessor::with_max_batch(2);
        assert!(storage.batch_put(&[]).await.is_err());

        let err = storage
            .batch_put(&[record(1), record(2), record(3)])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Write failed for USER: Batch size cannot exceed 2");
        assert!(storage.is_empty());
        assert_eq!(storage.batch_calls(), 0);
    }
}
