//! Observable events of madmall-db
//!
//! Events are explicit and typed. Each one maps to a stable
//! SCREAMING_SNAKE name used as the `event` key of a log line.

use std::fmt;

use super::logger::Severity;

/// Observable events
///
/// Cover configuration, migration plan and entity lifecycles, batch
/// loading and per-record rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Migration config loaded and validated
    ConfigLoaded,
    /// Migration plan resolved
    PlanLoaded,

    // Plan lifecycle
    /// Plan execution begins
    PlanStart,
    /// Every entity of the plan finished
    PlanComplete,
    /// Plan stopped before its last entity
    PlanFailed,

    // Entity lifecycle
    /// Entity migration begins
    EntityStart,
    /// Entity migration finished
    EntityComplete,
    /// Entity migration aborted
    EntityFailed,

    // Batches and records
    /// A batch was read from the source
    BatchExtracted,
    /// A batch of records was written
    BatchLoaded,
    /// A record failed transformation or validation
    RecordRejected,
    /// A storage write failed
    WriteFailed,

    // Validation
    /// A standalone validation ran
    ValidationComplete,

    /// Cancellation was requested
    CancelRequested,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::PlanLoaded => "PLAN_LOADED",

            Event::PlanStart => "MIGRATION_PLAN_BEGIN",
            Event::PlanComplete => "MIGRATION_PLAN_COMPLETE",
            Event::PlanFailed => "MIGRATION_PLAN_FAILED",

            Event::EntityStart => "ENTITY_MIGRATION_BEGIN",
            Event::EntityComplete => "ENTITY_MIGRATION_COMPLETE",
            Event::EntityFailed => "ENTITY_MIGRATION_FAILED",

            Event::BatchExtracted => "BATCH_EXTRACTED",
            Event::BatchLoaded => "BATCH_LOADED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::WriteFailed => "WRITE_FAILED",

            Event::ValidationComplete => "VALIDATION_COMPLETE",

            Event::CancelRequested => "CANCEL_REQUESTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PlanFailed | Event::EntityFailed | Event::WriteFailed => Severity::Error,
            Event::RecordRejected | Event::CancelRequested => Severity::Warn,
            Event::BatchExtracted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ConfigLoaded,
            Event::PlanLoaded,
            Event::PlanStart,
            Event::PlanComplete,
            Event::PlanFailed,
            Event::EntityStart,
            Event::EntityComplete,
            Event::EntityFailed,
            Event::BatchExtracted,
            Event::BatchLoaded,
            Event::RecordRejected,
            Event::WriteFailed,
            Event::ValidationComplete,
            Event::CancelRequested,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_severity() {
        assert_eq!(Event::EntityFailed.severity(), Severity::Error);
        assert_eq!(Event::RecordRejected.severity(), Severity::Warn);
        assert_eq!(Event::BatchLoaded.severity(), Severity::Info);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::PlanStart), "MIGRATION_PLAN_BEGIN");
        assert_eq!(format!("{}", Event::BatchLoaded), "BATCH_LOADED");
    }
}
