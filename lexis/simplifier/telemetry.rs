use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_logging::{JsonLogger, LogLevel, LogRecord};

/// Builder for simplifier telemetry sinks.
pub struct SimplifierTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    stderr: bool,
    min_level: LogLevel,
}

impl SimplifierTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            stderr: false,
            min_level: LogLevel::Info,
        }
    }

    /// Sets the log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Writes to stderr when no log path is set.
    #[must_use]
    pub const fn stderr(mut self, enabled: bool) -> Self {
        self.stderr = enabled;
        self
    }

    /// Sets the lowest level written.
    #[must_use]
    pub const fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<SimplifierTelemetry> {
        let logger = match (self.log_path, self.stderr) {
            (Some(path), _) => Some(JsonLogger::new(path)?),
            (None, true) => Some(JsonLogger::stderr()),
            (None, false) => None,
        }
        .map(|logger| logger.with_min_level(self.min_level));
        Ok(SimplifierTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                logger,
            }),
        })
    }
}

/// Telemetry handle shared across simplifier components.
#[derive(Clone)]
pub struct SimplifierTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for SimplifierTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplifierTelemetry")
            .field("module", &self.inner.module)
            .finish()
    }
}

struct TelemetryInner {
    module: String,
    logger: Option<JsonLogger>,
}

impl SimplifierTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> SimplifierTelemetryBuilder {
        SimplifierTelemetryBuilder::new(module)
    }

    /// Logs structured metadata.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            if !logger.enabled(level) {
                return Ok(());
            }
            let record = LogRecord::new(&self.inner.module, level, message).with_metadata(metadata);
            logger.log(&record)?;
        }
        Ok(())
    }

    /// Whether `level` records reach a sink.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.inner
            .logger
            .as_ref()
            .is_some_and(|logger| logger.enabled(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn telemetry_writes_filtered_log_lines() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("simplifier.log");
        let telemetry = SimplifierTelemetry::builder("simplifier")
            .log_path(&path)
            .min_level(LogLevel::Info)
            .build()
            .unwrap();
        telemetry
            .log(LogLevel::Info, "simplifier.request.start", json!({ "chars": 12 }))
            .unwrap();
        telemetry
            .log(LogLevel::Debug, "simplifier.token.replaced", json!({}))
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("simplifier.request.start"));
        assert!(!content.contains("simplifier.token.replaced"));
        assert!(!telemetry.enabled(LogLevel::Debug));
    }

    #[test]
    fn silent_handle_accepts_logs() {
        let telemetry = SimplifierTelemetry::builder("simplifier").build().unwrap();
        assert!(telemetry
            .log(LogLevel::Error, "simplifier.service.failed", json!({}))
            .is_ok());
        assert!(!telemetry.enabled(LogLevel::Error));
    }
}
