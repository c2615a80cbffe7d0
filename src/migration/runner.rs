//! Migration runner
//!
//! Drives one entity at a time through extract, transform, validate and
//! load. Batches of `batch_size` rows are processed concurrently, at most
//! `parallelism` in flight. Record failures are collected per entity and
//! never fail sibling records unless `continue_on_error` is off.

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use super::config::MigrationConfig;
use super::errors::{MigrationError, Result};
use super::mapping::{MigrationMapping, MigrationPlan};
use super::progress::{MigrationPhase, MigrationProgress, ProgressReporter};
use super::sink::StorageAccessor;
use super::source::{DataSource, SourceTarget};
use super::transform::{transform_row, Transformed};
use crate::entity::StorageRecord;
use crate::keys::iso_timestamp;
use crate::observability::{
    log_event, log_event_with_fields, Event, MetricsRegistry, MetricsSnapshot, ObservationScope,
};
use crate::validation::{
    apply_rules, validate_consistency, validate_entity, validate_keys, FieldRule,
    ValidationReport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordErrorType {
    Validation,
    Transformation,
    Write,
    Constraint,
}

/// A record that did not make it into the table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordError {
    /// The record's PK, or "unknown" before keys exist
    pub record_id: String,
    pub record: Value,
    pub error: String,
    pub error_type: RecordErrorType,
    pub timestamp: DateTime<Utc>,
}

impl RecordError {
    fn new(record_id: String, record: Value, error: String, error_type: RecordErrorType) -> Self {
        Self {
            record_id,
            record,
            error,
            error_type,
            timestamp: Utc::now(),
        }
    }
}

/// Outcome of migrating one entity type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub entity_type: String,
    pub total_records: usize,
    pub processed_records: usize,
    pub successful_records: usize,
    pub failed_records: usize,
    /// Filtered rows, plus the valid siblings of a failed record when
    /// `continue_on_error` is off; neither is written
    pub skipped_records: usize,
    pub errors: Vec<RecordError>,
    pub duration_ms: u64,
    /// Processed records per second
    pub throughput: f64,
    /// SHA-256 over the sorted `(PK, SK)` pairs written
    pub key_digest: String,
    /// Stopped before the last batch
    pub aborted: bool,
}

impl MigrationResult {
    fn empty(entity_type: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            total_records: 0,
            processed_records: 0,
            successful_records: 0,
            failed_records: 0,
            skipped_records: 0,
            errors: Vec::new(),
            duration_ms: 0,
            throughput: 0.0,
            key_digest: key_digest(Vec::new()),
            aborted: false,
        }
    }

    /// Result standing in for an entity whose run errored out
    fn from_error(entity_type: &str, error: &MigrationError) -> Self {
        let mut result = Self::empty(entity_type);
        result.aborted = matches!(error, MigrationError::Aborted { .. });
        result.errors.push(RecordError::new(
            entity_type.to_string(),
            Value::Null,
            error.to_string(),
            RecordErrorType::Constraint,
        ));
        result
    }
}

/// Outcome of a whole plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub run_id: Uuid,
    pub plan: String,
    pub version: String,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub results: Vec<MigrationResult>,
    pub aborted: bool,
}

impl PlanReport {
    pub fn successful_records(&self) -> usize {
        self.results.iter().map(|r| r.successful_records).sum()
    }

    pub fn failed_records(&self) -> usize {
        self.results.iter().map(|r| r.failed_records).sum()
    }

    pub fn result(&self, entity_type: &str) -> Option<&MigrationResult> {
        self.results.iter().find(|r| r.entity_type == entity_type)
    }
}

/// Digest of the emitted primary keys, independent of write order
pub fn key_digest(mut keys: Vec<(String, String)>) -> String {
    keys.sort();
    let mut hasher = Sha256::new();
    for (pk, sk) in &keys {
        hasher.update(pk.as_bytes());
        hasher.update([0u8]);
        hasher.update(sk.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// Per-entity state shared by its batches
struct EntityRun<'a> {
    mapping: &'a MigrationMapping,
    rules: &'a [FieldRule],
    target: SourceTarget,
    run_timestamp: &'a str,
    fail_fast: bool,
}

#[derive(Default)]
struct BatchOutcome {
    processed: usize,
    successful: usize,
    skipped: usize,
    errors: Vec<RecordError>,
    keys: Vec<(String, String)>,
    cancelled: bool,
}

/// Clears the running flag when a plan finishes, however it finishes
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct MigrationRunner {
    config: MigrationConfig,
    source: Arc<dyn DataSource>,
    storage: Arc<dyn StorageAccessor>,
    progress: ProgressReporter,
    metrics: MetricsRegistry,
    running: AtomicBool,
    cancelled: AtomicBool,
}

impl MigrationRunner {
    pub fn new(
        config: MigrationConfig,
        source: Arc<dyn DataSource>,
        storage: Arc<dyn StorageAccessor>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            storage,
            progress: ProgressReporter::new(),
            metrics: MetricsRegistry::new(),
            running: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Stream of progress updates across all entities
    pub fn subscribe(&self) -> watch::Receiver<Option<MigrationProgress>> {
        self.progress.subscribe()
    }

    pub fn progress(&self, entity_type: &str) -> Option<MigrationProgress> {
        self.progress.get(entity_type)
    }

    pub fn all_progress(&self) -> Vec<MigrationProgress> {
        self.progress.all()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Requests the running plan to stop; batches already in flight finish
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        log_event(Event::CancelRequested);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Executes every mapping of `plan` in order.
    ///
    /// A failed entity becomes a result carrying one constraint error. With
    /// `continue_on_error` off the first failure ends the plan: an entity
    /// aborted by a record error is still reported, while an entity that
    /// errored out is returned as the error.
    pub async fn execute_plan(&self, plan: &MigrationPlan) -> Result<PlanReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(MigrationError::AlreadyRunning);
        }
        let _guard = RunGuard(&self.running);
        self.cancelled.store(false, Ordering::SeqCst);

        plan.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let run_timestamp = iso_timestamp(started_at);
        let run_id_str = run_id.to_string();
        let entity_count = plan.entities.len().to_string();
        let config_hash = self.config.hash();
        let scope = ObservationScope::with_fields(
            "MIGRATION_PLAN",
            &[
                ("plan", plan.name.as_str()),
                ("run_id", run_id_str.as_str()),
                ("entities", entity_count.as_str()),
                ("config_hash", config_hash.as_str()),
            ],
        );

        let mut report = PlanReport {
            run_id,
            plan: plan.name.clone(),
            version: plan.version.clone(),
            dry_run: self.config.dry_run,
            started_at,
            completed_at: started_at,
            results: Vec::with_capacity(plan.entities.len()),
            aborted: false,
        };

        for mapping in &plan.entities {
            if self.is_cancelled() {
                report.aborted = true;
                break;
            }

            let rules = plan.rules_for(mapping);
            match self.migrate_entity_at(mapping, &rules, &run_timestamp).await {
                Ok(result) => {
                    let aborted = result.aborted;
                    report.results.push(result);
                    if aborted {
                        report.aborted = true;
                        break;
                    }
                }
                Err(e) => {
                    report
                        .results
                        .push(MigrationResult::from_error(&mapping.entity_type, &e));
                    if !self.config.continue_on_error {
                        scope.fail(&e.to_string());
                        return Err(e);
                    }
                    if matches!(e, MigrationError::Aborted { .. }) {
                        report.aborted = true;
                        break;
                    }
                }
            }
        }

        report.completed_at = Utc::now();
        if report.aborted {
            scope.fail("aborted");
        } else {
            let successful = report.successful_records().to_string();
            let failed = report.failed_records().to_string();
            scope.complete_with_fields(&[
                ("successful", successful.as_str()),
                ("failed", failed.as_str()),
            ]);
        }
        Ok(report)
    }

    /// Migrates a single entity with the mapping's own rules
    pub async fn migrate_entity(&self, mapping: &MigrationMapping) -> Result<MigrationResult> {
        let run_timestamp = iso_timestamp(Utc::now());
        self.migrate_entity_at(mapping, &mapping.validation, &run_timestamp)
            .await
    }

    async fn migrate_entity_at(
        &self,
        mapping: &MigrationMapping,
        rules: &[FieldRule],
        run_timestamp: &str,
    ) -> Result<MigrationResult> {
        let entity_type = mapping.entity_type.as_str();
        let scope =
            ObservationScope::with_fields("ENTITY_MIGRATION", &[("entity_type", entity_type)]);

        match self.run_entity(mapping, rules, run_timestamp).await {
            Ok(result) => {
                let final_phase = if result.aborted {
                    self.metrics.increment_entities_failed();
                    scope.fail("record error with continue_on_error disabled");
                    MigrationPhase::Failed
                } else {
                    self.metrics.increment_entities_completed();
                    let successful = result.successful_records.to_string();
                    let failed = result.failed_records.to_string();
                    let skipped = result.skipped_records.to_string();
                    scope.complete_with_fields(&[
                        ("successful", successful.as_str()),
                        ("failed", failed.as_str()),
                        ("skipped", skipped.as_str()),
                    ]);
                    MigrationPhase::Completed
                };
                self.progress.update(entity_type, |p| {
                    p.phase = final_phase;
                    p.recompute(Utc::now());
                });
                Ok(result)
            }
            Err(e) => {
                self.metrics.increment_entities_failed();
                self.progress
                    .update(entity_type, |p| p.phase = MigrationPhase::Failed);
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    async fn run_entity(
        &self,
        mapping: &MigrationMapping,
        rules: &[FieldRule],
        run_timestamp: &str,
    ) -> Result<MigrationResult> {
        let started = std::time::Instant::now();
        let entity_type = mapping.entity_type.as_str();
        let target = mapping.source_target()?;

        let batch_size = self.config.batch_size;
        let total_records = self.source.row_count(&target).await?;
        let progress = MigrationProgress::new(entity_type, total_records, batch_size);
        let total_batches = progress.total_batches;
        self.progress.publish(progress);

        let fail_fast = !self.config.continue_on_error;
        let parallelism = if fail_fast { 1 } else { self.config.parallelism };
        let run = EntityRun {
            mapping,
            rules,
            target,
            run_timestamp,
            fail_fast,
        };

        let mut result = MigrationResult::empty(entity_type);
        result.total_records = total_records;
        let mut keys = Vec::with_capacity(total_records);
        let mut cancelled = false;

        let mut batches = stream::iter(0..total_batches)
            .map(|index| self.run_batch(&run, index))
            .buffer_unordered(parallelism);

        while let Some(outcome) = batches.next().await {
            let outcome = outcome?;
            if outcome.cancelled {
                cancelled = true;
                break;
            }

            result.processed_records += outcome.processed;
            result.successful_records += outcome.successful;
            result.skipped_records += outcome.skipped;
            result.failed_records += outcome.errors.len();
            let batch_errors = outcome.errors.len();
            result.errors.extend(outcome.errors);
            keys.extend(outcome.keys);

            let processed = result.processed_records;
            self.progress.update(entity_type, |p| {
                p.processed_records = processed;
                p.current_batch += 1;
                p.errors += batch_errors;
                p.recompute(Utc::now());
            });

            if fail_fast && batch_errors > 0 {
                result.aborted = true;
                break;
            }
        }

        if cancelled {
            return Err(MigrationError::aborted(entity_type, "cancelled"));
        }

        result.duration_ms = started.elapsed().as_millis() as u64;
        let seconds = (result.duration_ms.max(1)) as f64 / 1000.0;
        result.throughput = result.processed_records as f64 / seconds;
        result.key_digest = key_digest(keys);
        Ok(result)
    }

    async fn run_batch(&self, run: &EntityRun<'_>, index: usize) -> Result<BatchOutcome> {
        if self.is_cancelled() {
            return Ok(BatchOutcome {
                cancelled: true,
                ..BatchOutcome::default()
            });
        }

        let entity_type = run.mapping.entity_type.as_str();
        let batch_size = self.config.batch_size;
        let rows = self
            .source
            .fetch(&run.target, index * batch_size, batch_size)
            .await?;

        let batch = index.to_string();
        let row_count = rows.len().to_string();
        self.metrics.add_extracted(rows.len() as u64);
        log_event_with_fields(
            Event::BatchExtracted,
            &[
                ("entity_type", entity_type),
                ("batch", batch.as_str()),
                ("rows", row_count.as_str()),
            ],
        );

        let mut outcome = BatchOutcome {
            processed: rows.len(),
            ..BatchOutcome::default()
        };

        self.progress
            .update(entity_type, |p| p.phase = MigrationPhase::Transforming);
        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            match transform_row(&row, run.mapping, run.run_timestamp) {
                Ok(Transformed::Record(record)) => candidates.push(record),
                Ok(Transformed::Filtered) => outcome.skipped += 1,
                Err(e) => outcome.errors.push(RecordError::new(
                    text_or_unknown(row.get("id")),
                    row,
                    e.to_string(),
                    RecordErrorType::Transformation,
                )),
            }
        }

        if self.config.validate_data {
            self.progress
                .update(entity_type, |p| p.phase = MigrationPhase::Validating);
        }
        let mut valid = Vec::with_capacity(candidates.len());
        for record in candidates {
            let record_id = text_or_unknown(record.get("PK"));
            if self.config.validate_data {
                if let Some(message) = check_record(&record, run.rules) {
                    outcome.errors.push(RecordError::new(
                        record_id,
                        record,
                        message,
                        RecordErrorType::Validation,
                    ));
                    continue;
                }
            }
            match StorageRecord::from_value(record.clone()) {
                Ok(stored) => valid.push(stored),
                Err(e) => outcome.errors.push(RecordError::new(
                    record_id,
                    record,
                    e.to_string(),
                    RecordErrorType::Transformation,
                )),
            }
        }

        for error in &outcome.errors {
            log_event_with_fields(
                Event::RecordRejected,
                &[
                    ("entity_type", entity_type),
                    ("record_id", error.record_id.as_str()),
                    ("error", error.error.as_str()),
                ],
            );
        }
        let held_back = run.fail_fast && !outcome.errors.is_empty();
        if held_back {
            outcome.skipped += valid.len();
        }
        self.metrics.add_failed(outcome.errors.len() as u64);
        self.metrics.add_skipped(outcome.skipped as u64);

        if held_back {
            return Ok(outcome);
        }

        self.load(entity_type, valid, &mut outcome).await;
        Ok(outcome)
    }

    /// Writes `records` in `max_write_batch` chunks. A rejected chunk fails
    /// each of its records; other chunks are unaffected.
    async fn load(&self, entity_type: &str, records: Vec<StorageRecord>, outcome: &mut BatchOutcome) {
        if records.is_empty() {
            return;
        }
        self.progress
            .update(entity_type, |p| p.phase = MigrationPhase::Loading);

        if self.config.dry_run {
            outcome.successful += records.len();
            outcome
                .keys
                .extend(records.iter().map(|r| (r.pk.clone(), r.sk.clone())));
            return;
        }

        for chunk in records.chunks(self.config.max_write_batch) {
            match self.storage.batch_put(chunk).await {
                Ok(()) => {
                    outcome.successful += chunk.len();
                    outcome
                        .keys
                        .extend(chunk.iter().map(|r| (r.pk.clone(), r.sk.clone())));
                    self.metrics.add_written(chunk.len() as u64);
                    self.metrics.increment_batches_loaded();
                    let written = chunk.len().to_string();
                    log_event_with_fields(
                        Event::BatchLoaded,
                        &[("entity_type", entity_type), ("records", written.as_str())],
                    );
                }
                Err(e) => {
                    let message = e.to_string();
                    self.metrics.increment_write_failures();
                    self.metrics.add_failed(chunk.len() as u64);
                    log_event_with_fields(
                        Event::WriteFailed,
                        &[("entity_type", entity_type), ("error", message.as_str())],
                    );
                    outcome.errors.extend(chunk.iter().map(|record| {
                        RecordError::new(
                            record.pk.clone(),
                            record.to_value(),
                            message.clone(),
                            RecordErrorType::Write,
                        )
                    }));
                }
            }
        }
    }
}

fn text_or_unknown(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "unknown".to_string(),
    }
}

/// Runs the validation layers in order and stops at the first one that
/// reports errors. Warnings never reject a record.
fn check_record(record: &Value, rules: &[FieldRule]) -> Option<String> {
    let layers: [fn(&Value) -> ValidationReport; 3] =
        [validate_keys, validate_consistency, validate_entity];
    for layer in layers {
        let report = layer(record);
        if !report.is_valid() {
            return Some(report.error_summary());
        }
    }
    if rules.is_empty() {
        return None;
    }
    let report = apply_rules(rules, record);
    (!report.is_valid()).then(|| report.error_summary())
}
