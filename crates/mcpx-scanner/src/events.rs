//! Structured log events
//!
//! Components report through a [`Logger`] handed to them at construction.
//! Logging is fire-and-forget: nothing in the scanner or the engine depends
//! on a logger being present, and [`NoopLogger`] is always a valid choice.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Mutex;

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

/// One structured event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub level: LogLevel,
    /// Component that emitted the event (`scanner`, `engine`, ...)
    pub source: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl LogEvent {
    pub fn new(level: LogLevel, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            source: source.into(),
            message: message.into(),
            data: None,
        }
    }

    pub fn debug(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, source, message)
    }

    pub fn info(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, source, message)
    }

    pub fn warn(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, source, message)
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, source, message)
    }

    /// Attach structured data
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Sink for structured log events
pub trait Logger: Send + Sync {
    fn log(&self, event: LogEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _event: LogEvent) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, event: LogEvent) {
        let data = event.data.as_ref().map(ToString::to_string).unwrap_or_default();
        let source = event.source.as_str();
        match event.level {
            LogLevel::Debug => tracing::debug!(source, data = %data, "{}", event.message),
            LogLevel::Info => tracing::info!(source, data = %data, "{}", event.message),
            LogLevel::Warn => tracing::warn!(source, data = %data, "{}", event.message),
            LogLevel::Error => tracing::error!(source, data = %data, "{}", event.message),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Count of events at a given level
    pub fn count(&self, level: LogLevel) -> usize {
        self.events().iter().filter(|e| e.level == level).count()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
