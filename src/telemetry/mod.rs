//! # Telemetry Module
//!
//! Injected logging capability for the bridge components.
//!
//! Components never reach for a global logger. Each one holds an
//! `Arc<dyn LogSink>` handed to it at construction, so tests can capture
//! exactly what a component reported.
//!
//! | Sink | Description |
//! |------|-------------|
//! | [`TracingLogSink`] | Default sink, forwards to `tracing` |
//! | [`NoopLogSink`] | Discards everything |
//! | [`InMemoryLogSink`] | Captures records for inspection in tests |

use std::fmt;
use std::sync::{Arc, RwLock};

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// Destination for component log records.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, component: &str, message: &str);

    fn debug(&self, component: &str, message: &str) {
        self.log(LogLevel::Debug, component, message);
    }

    fn warn(&self, component: &str, message: &str) {
        self.log(LogLevel::Warn, component, message);
    }

    fn error(&self, component: &str, message: &str) {
        self.log(LogLevel::Error, component, message);
    }
}

/// Forwards records to the `tracing` macros with a `component` field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, component: &str, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(component, "{}", message),
            LogLevel::Warn => tracing::warn!(component, "{}", message),
            LogLevel::Error => tracing::error!(component, "{}", message),
        }
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    fn log(&self, _level: LogLevel, _component: &str, _message: &str) {}
}

/// A captured log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub component: String,
    pub message: String,
}

/// In-memory sink for testing.
#[derive(Debug, Default)]
pub struct InMemoryLogSink {
    records: RwLock<Vec<LogRecord>>,
}

impl InMemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.read().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn records_at(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.write() {
            records.clear();
        }
    }
}

impl LogSink for InMemoryLogSink {
    fn log(&self, level: LogLevel, component: &str, message: &str) {
        if let Ok(mut records) = self.records.write() {
            records.push(LogRecord {
                level,
                component: component.to_string(),
                message: message.to_string(),
            });
        }
    }
}

/// Shared handle to the default `tracing`-backed sink.
pub fn tracing_sink() -> Arc<dyn LogSink> {
    Arc::new(TracingLogSink)
}

/// Shared handle to a sink that drops everything.
pub fn noop_sink() -> Arc<dyn LogSink> {
    Arc::new(NoopLogSink)
}
