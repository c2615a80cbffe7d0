//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::migration::MigrationError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration or plan file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Runtime could not start
    RuntimeFailed,
    /// Migration stopped or errored
    MigrationFailed,
    /// Record failed validation
    InvalidRecord,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "MADMALL_CLI_CONFIG_ERROR",
            Self::IoError => "MADMALL_CLI_IO_ERROR",
            Self::RuntimeFailed => "MADMALL_CLI_RUNTIME_FAILED",
            Self::MigrationFailed => "MADMALL_CLI_MIGRATION_FAILED",
            Self::InvalidRecord => "MADMALL_CLI_INVALID_RECORD",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn runtime_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::RuntimeFailed, msg)
    }

    pub fn migration_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::MigrationFailed, msg)
    }

    /// Record rejected with `count` errors
    pub fn invalid_record(count: usize) -> Self {
        Self::new(
            CliErrorCode::InvalidRecord,
            format!("Record failed validation with {} error(s)", count),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<MigrationError> for CliError {
    fn from(e: MigrationError) -> Self {
        match e {
            MigrationError::Config(msg) => Self::config_error(msg),
            other => Self::migration_failed(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_code() {
        let err = CliError::invalid_record(2);
        assert_eq!(
            err.to_string(),
            "MADMALL_CLI_INVALID_RECORD: Record failed validation with 2 error(s)"
        );
    }

    #[test]
    fn test_from_migration_error() {
        let err: CliError = MigrationError::Config("batchSize must be > 0".into()).into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);

        let err: CliError = MigrationError::AlreadyRunning.into();
        assert_eq!(err.code_str(), "MADMALL_CLI_MIGRATION_FAILED");
    }
}
