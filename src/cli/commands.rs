//! CLI command implementations
//!
//! Commands load their inputs, run on the library and print one JSON
//! object to stdout. Logs go to stderr through `tracing`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

use crate::entity::EntityType;
use crate::migration::{
    default_plan, DataSource, JsonFileSource, LogLevel, MemoryAccessor, MigrationConfig,
    MigrationPlan, MigrationRunner, PlanReport, SourceType,
};
use crate::observability::{log_event_with_fields, Event};
use crate::validation::{validate_as, validate_record, ValidationReport};

use super::args::{Command, LogFormat};
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{read_request, write_json, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command, cli.log_format)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command, format: LogFormat) -> CliResult<()> {
    match cmd {
        Command::Migrate {
            config,
            plan,
            dry_run,
        } => migrate(&config, plan.as_deref(), dry_run, format).map(|_| ()),
        Command::Validate { entity_type } => {
            init_tracing(LogLevel::Warn, format);
            validate(entity_type.as_deref())
        }
        Command::Plan => plan(),
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides `level`.
///
/// A subscriber that is already installed is kept.
pub fn init_tracing(level: LogLevel, format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

/// Run a migration plan
///
/// - Loads and validates the config; `--dry-run` forces a dry run
/// - Uses the plan file if given, the built-in plan otherwise
/// - Ctrl-C cancels the run after in-flight batches finish
/// - Prints the plan report with run metrics
pub fn migrate(
    config_path: &Path,
    plan_path: Option<&Path>,
    dry_run: bool,
    format: LogFormat,
) -> CliResult<PlanReport> {
    let mut config = MigrationConfig::load(config_path)
        .map_err(|e| CliError::config_error(format!("Failed to load config: {}", e)))?;
    config.dry_run |= dry_run;
    init_tracing(config.log_level, format);

    let config_hash = config.hash();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("target_table", config.target_table.as_str()),
            ("config_hash", config_hash.as_str()),
        ],
    );

    let plan = load_plan(plan_path)?;
    let entity_count = plan.entities.len().to_string();
    log_event_with_fields(
        Event::PlanLoaded,
        &[("plan", plan.name.as_str()), ("entities", entity_count.as_str())],
    );

    let source = open_source(&config)?;
    let storage = Arc::new(MemoryAccessor::with_max_batch(config.max_write_batch));
    let runner = MigrationRunner::new(config, source, storage.clone())?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let report = rt.block_on(async {
        let run = runner.execute_plan(&plan);
        tokio::pin!(run);
        tokio::select! {
            result = &mut run => result,
            Ok(()) = tokio::signal::ctrl_c() => {
                runner.cancel();
                run.await
            }
        }
    })?;

    write_response(json!({
        "report": report,
        "metrics": runner.metrics(),
        "storedRecords": storage.len(),
    }))?;

    if report.aborted {
        return Err(CliError::migration_failed(format!(
            "Plan '{}' stopped before completion",
            report.plan
        )));
    }
    Ok(report)
}

fn load_plan(plan_path: Option<&Path>) -> CliResult<MigrationPlan> {
    match plan_path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| CliError::config_error(format!("Failed to read plan: {}", e)))?;
            MigrationPlan::from_json(&content)
                .map_err(|e| CliError::config_error(format!("Invalid plan: {}", e)))
        }
        None => Ok(default_plan()),
    }
}

fn open_source(config: &MigrationConfig) -> CliResult<Arc<dyn DataSource>> {
    match (&config.source_type, &config.source_path) {
        (SourceType::Json, Some(path)) => Ok(Arc::new(JsonFileSource::new(path))),
        (SourceType::Json, None) => Err(CliError::config_error(
            "sourcePath is required for json sources",
        )),
        (SourceType::Memory, _) => Err(CliError::config_error(
            "memory sources cannot be used from the command line",
        )),
    }
}

/// Validate one record read from stdin and print its report.
///
/// Fails with `MADMALL_CLI_INVALID_RECORD` when the report has errors.
pub fn validate(entity_type: Option<&str>) -> CliResult<()> {
    let record = read_request()?;
    let report = validate_value(&record, entity_type)?;
    write_response(serde_json::to_value(&report)?)?;

    if report.is_valid() {
        Ok(())
    } else {
        Err(CliError::invalid_record(report.errors().len()))
    }
}

/// Full record check, or only the named schema when `entity_type` is set
fn validate_value(record: &Value, entity_type: Option<&str>) -> CliResult<ValidationReport> {
    let report = match entity_type {
        Some(name) => {
            let entity_type = EntityType::parse(name).ok_or_else(|| {
                CliError::new(
                    CliErrorCode::InvalidRecord,
                    format!("Unknown entity type: {}", name),
                )
            })?;
            validate_as(entity_type, record)
        }
        None => validate_record(record),
    };

    let errors = report.errors().len().to_string();
    let warnings = report.warnings().len().to_string();
    log_event_with_fields(
        Event::ValidationComplete,
        &[("errors", errors.as_str()), ("warnings", warnings.as_str())],
    );
    Ok(report)
}

/// Print the built-in plan
pub fn plan() -> CliResult<()> {
    let json = serde_json::to_string_pretty(&default_plan())?;
    write_json(&json)
}
