//! Migration pipeline
//!
//! Imports legacy rows into the single table:
//!
//! 1. Extract: a [`DataSource`] hands out offset/limit batches
//! 2. Transform: a [`MigrationMapping`] derives keys and attributes
//! 3. Validate: keys, consistency, entity rules, then mapping rules
//! 4. Load: a [`StorageAccessor`] upserts chunks by `(PK, SK)`
//!
//! [`MigrationRunner::execute_plan`] runs a [`MigrationPlan`] entity by
//! entity; [`default_plan`] is the built-in plan for the platform tables.

mod config;
mod errors;
mod mapping;
mod mappings;
mod progress;
mod runner;
mod sink;
mod source;
mod transform;

pub use config::{LogLevel, MigrationConfig, SourceType};
pub use errors::{MigrationError, Result};
pub use mapping::{
    FieldMap, FieldMapping, FieldTransform, Filter, FilterRule, KeyMapping, KeyRule,
    MigrationMapping, MigrationPlan, Transformation, TransformationRule,
};
pub use mappings::{
    businesses, circles, default_plan, resources, stories, users, DEFAULT_PLAN_NAME,
    DEFAULT_PLAN_VERSION,
};
pub use progress::{MigrationPhase, MigrationProgress, ProgressReporter};
pub use runner::{
    key_digest, MigrationResult, MigrationRunner, PlanReport, RecordError, RecordErrorType,
};
pub use sink::{MemoryAccessor, StorageAccessor};
pub use source::{DataSource, JsonFileSource, MemorySource, SourceTarget};
pub use transform::{transform_row, TransformError, Transformed};
