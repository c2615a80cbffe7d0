//! Structured logger for madmall-db
//!
//! - One log line = one event
//! - Deterministic key ordering: `event`, `severity`, then fields by key
//! - Events are emitted through `tracing`; the binary decides the format

use std::fmt;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable, process exits
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured logger facade
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    ///
    /// The event name is the tracing message; `severity` and the rendered
    /// fields are tracing fields for the subscriber's formatter.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let fields = Self::render_fields(fields);
        let level = severity.as_str();
        match severity {
            Severity::Trace => {
                tracing::debug!(target: "madmall_db", severity = level, fields = %fields, "{}", event)
            }
            Severity::Info => {
                tracing::info!(target: "madmall_db", severity = level, fields = %fields, "{}", event)
            }
            Severity::Warn => {
                tracing::warn!(target: "madmall_db", severity = level, fields = %fields, "{}", event)
            }
            Severity::Error | Severity::Fatal => {
                tracing::error!(target: "madmall_db", severity = level, fields = %fields, "{}", event)
            }
        }
    }

    /// Renders fields as `key=value` pairs sorted by key
    ///
    /// Values that are empty or contain whitespace, quotes, `=` or control
    /// characters are quoted and escaped.
    pub fn render_fields(fields: &[(&str, &str)]) -> String {
        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        let mut output = String::with_capacity(64);
        for (i, (key, value)) in sorted_fields.into_iter().enumerate() {
            if i > 0 {
                output.push(' ');
            }
            output.push_str(key);
            output.push('=');
            if Self::needs_quotes(value) {
                Self::push_quoted(&mut output, value);
            } else {
                output.push_str(value);
            }
        }
        output
    }

    fn needs_quotes(value: &str) -> bool {
        value.is_empty()
            || value
                .chars()
                .any(|c| c.is_whitespace() || c.is_control() || c == '"' || c == '=')
    }

    fn push_quoted(output: &mut String, s: &str) {
        output.push('"');
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
        output.push('"');
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_render_fields_plain_pairs() {
        let output = Logger::render_fields(&[("entity", "USER"), ("batch", "3")]);
        assert_eq!(output, "batch=3 entity=USER");
        assert!(serde_json::from_str::<serde_json::Value>(&output).is_err());
        assert_eq!(Logger::render_fields(&[]), "");
    }

    #[test]
    fn test_render_deterministic_ordering() {
        let a = Logger::render_fields(&[("zeta", "1"), ("alpha", "2")]);
        let b = Logger::render_fields(&[("alpha", "2"), ("zeta", "1")]);
        assert_eq!(a, b);
        assert!(a.find("alpha").unwrap() < a.find("zeta").unwrap());
    }

    #[test]
    fn test_render_fields_quotes_values() {
        let output = Logger::render_fields(&[
            ("error", "quote \" and\nnewline"),
            ("empty", ""),
        ]);
        assert_eq!(output, r#"empty="" error="quote \" and\nnewline""#);
    }

    #[test]
    fn test_log_without_subscriber() {
        Logger::info("TEST_EVENT", &[("k", "v")]);
        Logger::error("TEST_EVENT", &[]);
    }
}
