//! Migration run configuration.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::errors::{MigrationError, Result};
use crate::validation::DEFAULT_MAX_BATCH_SIZE;

/// Where source rows come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// A directory of `<table>.json` files
    Json,
    /// Rows supplied in-process
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationConfig {
    #[serde(default = "default_source_type")]
    pub source_type: SourceType,

    /// Directory holding the source files when `source_type` is `json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,

    #[serde(default = "default_target_table")]
    pub target_table: String,

    /// Rows fetched per source batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Batches in flight at once
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Validate and count, but never write
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_true")]
    pub validate_data: bool,

    /// Keep going after record errors and failed entities
    #[serde(default = "default_true")]
    pub continue_on_error: bool,

    /// Largest batch handed to the storage accessor
    #[serde(default = "default_max_write_batch")]
    pub max_write_batch: usize,

    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

fn default_source_type() -> SourceType {
    SourceType::Json
}

fn default_target_table() -> String {
    "madmall-platform".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_parallelism() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_max_write_batch() -> usize {
    DEFAULT_MAX_BATCH_SIZE
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            source_type: default_source_type(),
            source_path: None,
            target_table: default_target_table(),
            batch_size: default_batch_size(),
            parallelism: default_parallelism(),
            dry_run: false,
            validate_data: true,
            continue_on_error: true,
            max_write_batch: default_max_write_batch(),
            log_level: default_log_level(),
        }
    }
}

impl MigrationConfig {
    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MigrationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_table.trim().is_empty() {
            return Err(MigrationError::Config("targetTable is required".into()));
        }
        if self.batch_size == 0 {
            return Err(MigrationError::Config("batchSize must be at least 1".into()));
        }
        if self.parallelism == 0 {
            return Err(MigrationError::Config("parallelism must be at least 1".into()));
        }
        if self.max_write_batch == 0 || self.max_write_batch > DEFAULT_MAX_BATCH_SIZE {
            return Err(MigrationError::Config(format!(
                "maxWriteBatch must be between 1 and {}, got {}",
                DEFAULT_MAX_BATCH_SIZE, self.max_write_batch
            )));
        }
        if self.source_type == SourceType::Json && self.source_path.is_none() {
            return Err(MigrationError::Config(
                "sourcePath is required for json sources".into(),
            ));
        }
        Ok(())
    }

    /// SHA-256 of the serialized config, logged with each run
    pub fn hash(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
