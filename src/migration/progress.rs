//! Observable migration progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationPhase {
    Extracting,
    Transforming,
    Validating,
    Loading,
    Completed,
    Failed,
}

impl MigrationPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MigrationPhase::Completed | MigrationPhase::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationProgress {
    pub entity_type: String,
    pub phase: MigrationPhase,
    pub total_records: usize,
    pub processed_records: usize,
    pub current_batch: usize,
    pub total_batches: usize,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
    /// Records per second
    pub throughput: f64,
    /// Record errors so far
    pub errors: usize,
}

impl MigrationProgress {
    pub fn new(entity_type: &str, total_records: usize, batch_size: usize) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            phase: MigrationPhase::Extracting,
            total_records,
            processed_records: 0,
            current_batch: 0,
            total_batches: total_records.div_ceil(batch_size.max(1)),
            started_at: Utc::now(),
            estimated_completion: None,
            throughput: 0.0,
            errors: 0,
        }
    }

    /// Refreshes throughput and the completion estimate from `now`
    pub fn recompute(&mut self, now: DateTime<Utc>) {
        let elapsed_ms = (now - self.started_at).num_milliseconds();
        if elapsed_ms <= 0 {
            return;
        }
        self.throughput = self.processed_records as f64 / (elapsed_ms as f64 / 1000.0);
        if self.total_records > 0 && self.throughput > 0.0 {
            let remaining = self.total_records.saturating_sub(self.processed_records) as f64;
            let eta_ms = (remaining / self.throughput * 1000.0) as i64;
            self.estimated_completion = Some(now + chrono::Duration::milliseconds(eta_ms));
        }
    }
}

/// Latest progress per entity, plus a watch channel carrying the most
/// recent update of any entity
pub struct ProgressReporter {
    tx: watch::Sender<Option<MigrationProgress>>,
    latest: Mutex<BTreeMap<String, MigrationProgress>>,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx,
            latest: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<MigrationProgress>> {
        self.tx.subscribe()
    }

    fn latest(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, MigrationProgress>> {
        self.latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces the entity's progress and notifies subscribers
    pub fn publish(&self, progress: MigrationProgress) {
        self.latest()
            .insert(progress.entity_type.clone(), progress.clone());
        self.tx.send_replace(Some(progress));
    }

    /// Applies `f` to the entity's progress, if tracked, and publishes it
    pub fn update<F>(&self, entity_type: &str, f: F)
    where
        F: FnOnce(&mut MigrationProgress),
    {
        let updated = {
            let mut latest = self.latest();
            latest.get_mut(entity_type).map(|progress| {
                f(progress);
                progress.clone()
            })
        };
        if let Some(progress) = updated {
            self.tx.send_replace(Some(progress));
        }
    }

    pub fn get(&self, entity_type: &str) -> Option<MigrationProgress> {
        self.latest().get(entity_type).cloned()
    }

    pub fn all(&self) -> Vec<MigrationProgress> {
        self.latest().values().cloned().collect()
    }
}
