#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Structured JSON-lines logging shared by the lexis crates.

use std::{
    fmt,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Log severity level, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Per-token diagnostics.
    Debug,
    /// Request lifecycle events.
    Info,
    /// Degraded behaviour that did not fail the request.
    Warn,
    /// Request-level failures.
    Error,
}

impl LogLevel {
    /// Upper-case label used in log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognised.
#[derive(Debug, Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

/// Structured log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp in ISO8601.
    pub timestamp: DateTime<Utc>,
    /// Module emitting the log.
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Dotted event name or human-readable message.
    pub message: String,
    /// Structured fields attached to the event.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            metadata: Map::new(),
        }
    }

    /// Adds a single metadata field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merges every field of a JSON object into the metadata. Non-object values are ignored.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        if let Value::Object(fields) = metadata {
            self.metadata.extend(fields);
        }
        self
    }
}

#[derive(Debug)]
enum Sink {
    File(File),
    Stderr,
}

/// Thread-safe JSON-lines logger writing to a file or to stderr.
#[derive(Debug)]
pub struct JsonLogger {
    path: Option<PathBuf>,
    sink: Mutex<Sink>,
    min_level: LogLevel,
}

impl JsonLogger {
    /// Creates or opens an append-only log file, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path: Some(path),
            sink: Mutex::new(Sink::File(file)),
            min_level: LogLevel::Debug,
        })
    }

    /// Creates a logger writing one JSON object per line to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            path: None,
            sink: Mutex::new(Sink::Stderr),
            min_level: LogLevel::Debug,
        }
    }

    /// Drops records below `level`.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Lowest level that is written.
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Whether records at `level` would be written.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Writes a record as one JSON line unless it is below the minimum level.
    pub fn log(&self, record: &LogRecord) -> Result<()> {
        if !self.enabled(record.level) {
            return Ok(());
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut sink = self.sink.lock();
        match &mut *sink {
            Sink::File(file) => {
                file.write_all(line.as_bytes())?;
                file.flush()?;
            }
            Sink::Stderr => {
                let mut stderr = io::stderr().lock();
                stderr.write_all(line.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Log file path, `None` for the stderr sink.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn writes_json_lines_with_fields() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("logs/lexis.log")).unwrap();
        logger
            .log(
                &LogRecord::new("simplifier", LogLevel::Info, "simplifier.request.start")
                    .with_field("chars", 42),
            )
            .unwrap();
        let content = fs::read_to_string(logger.path().unwrap()).unwrap();
        let parsed: LogRecord = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(parsed.message, "simplifier.request.start");
        assert_eq!(parsed.metadata["chars"], json!(42));
        assert!(content.contains("\"level\":\"INFO\""));
    }

    #[test]
    fn drops_records_below_min_level() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("quiet.log"))
            .unwrap()
            .with_min_level(LogLevel::Warn);
        logger
            .log(&LogRecord::new("simplifier", LogLevel::Debug, "noise"))
            .unwrap();
        logger
            .log(&LogRecord::new("simplifier", LogLevel::Warn, "degraded"))
            .unwrap();
        let content = fs::read_to_string(logger.path().unwrap()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("degraded"));
    }

    #[test]
    fn parses_level_names() {
        assert_eq!("Warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Error > LogLevel::Debug);
    }

    #[test]
    fn metadata_merge_ignores_non_objects() {
        let record = LogRecord::new("m", LogLevel::Debug, "x")
            .with_metadata(json!({ "a": 1 }))
            .with_metadata(json!("scalar"));
        assert_eq!(record.metadata.len(), 1);
    }
}
