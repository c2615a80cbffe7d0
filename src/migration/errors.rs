//! Error types for migration runs.
//!
//! Record-level problems never surface here; they are collected as
//! [`RecordError`](super::RecordError)s in the entity's result. These are
//! run-level failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    /// Invalid config or plan
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source could not be read
    #[error("Source error: {0}")]
    Source(String),

    /// Storage write rejected
    #[error("Write failed for {entity_type}: {message}")]
    Write { entity_type: String, message: String },

    /// A plan is already executing on this runner
    #[error("Migration is already running")]
    AlreadyRunning,

    /// Entity run stopped early (fail-fast or cancellation)
    #[error("Migration of {entity_type} aborted: {reason}")]
    Aborted { entity_type: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MigrationError {
    pub fn write(entity_type: impl Into<String>, message: impl Into<String>) -> Self {
        MigrationError::Write {
            entity_type: entity_type.into(),
            message: message.into(),
        }
    }

    pub fn aborted(entity_type: impl Into<String>, reason: impl Into<String>) -> Self {
        MigrationError::Aborted {
            entity_type: entity_type.into(),
            reason: reason.into(),
        }
    }

    /// Format error with its full cause chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = MigrationError::write("USER", "batch of 26 exceeds limit 25");
        assert_eq!(
            err.to_string(),
            "Write failed for USER: batch of 26 exceeds limit 25"
        );
        assert_eq!(
            MigrationError::AlreadyRunning.to_string(),
            "Migration is already running"
        );
    }

    #[test]
    fn test_format_detailed_includes_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "users.json");
        let err = MigrationError::from(io);
        let detailed = err.format_detailed();
        assert!(detailed.starts_with("Error: IO error: users.json"));
    }
}
