//! Migration counters
//!
//! - Counters only, monotonic
//! - Thread-safe, lock-free

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters shared by every batch of a run
///
/// Uses Relaxed ordering; counters are read after the run settles.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    records_extracted: AtomicU64,
    records_written: AtomicU64,
    records_failed: AtomicU64,
    records_skipped: AtomicU64,
    batches_loaded: AtomicU64,
    write_failures: AtomicU64,
    entities_completed: AtomicU64,
    entities_failed: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_extracted(&self, count: u64) {
        self.records_extracted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_written(&self, count: u64) {
        self.records_written.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_failed(&self, count: u64) {
        self.records_failed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_skipped(&self, count: u64) {
        self.records_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_batches_loaded(&self) {
        self.batches_loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_write_failures(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_entities_completed(&self) {
        self.entities_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_entities_failed(&self) {
        self.entities_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_extracted: self.records_extracted.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            records_failed: self.records_failed.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            batches_loaded: self.batches_loaded.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            entities_completed: self.entities_completed.load(Ordering::Relaxed),
            entities_failed: self.entities_failed.load(Ordering::Relaxed),
        }
    }

    /// Snapshot rendered as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_extracted: u64,
    pub records_written: u64,
    pub records_failed: u64,
    pub records_skipped: u64,
    pub batches_loaded: u64,
    pub write_failures: u64,
    pub entities_completed: u64,
    pub entities_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.records_extracted, 0);
        assert_eq!(snapshot.records_written, 0);
        assert_eq!(snapshot.batches_loaded, 0);
    }

    #[test]
    fn test_counters() {
        let registry = MetricsRegistry::new();
        registry.add_extracted(10);
        registry.add_written(8);
        registry.add_failed(1);
        registry.add_skipped(1);
        registry.increment_batches_loaded();
        registry.increment_entities_completed();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.records_extracted, 10);
        assert_eq!(snapshot.records_written, 8);
        assert_eq!(snapshot.records_failed, 1);
        assert_eq!(snapshot.records_skipped, 1);
        assert_eq!(snapshot.batches_loaded, 1);
        assert_eq!(snapshot.entities_completed, 1);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.add_written(25);

        let parsed: serde_json::Value = serde_json::from_str(&registry.to_json()).unwrap();
        assert_eq!(parsed["records_written"], 25);
        assert_eq!(parsed["write_failures"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.add_written(1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().records_written, 1000);
    }
}
