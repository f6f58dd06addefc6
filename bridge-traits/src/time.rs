//! Time source and host logging abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::{error::Result, platform::PlatformSendSync};

/// Injectable wall clock.
///
/// Session expiry and clipboard timestamps read time through this trait so
/// tests can pin "now".
pub trait Clock: PlatformSendSync {
    fn now(&self) -> DateTime<Utc>;

    fn unix_timestamp_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Clock backed by the system (or `Date.now()` in the browser).
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Structured log record handed to a [`LoggerSink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Module path or explicit `target:` of the event.
    pub target: String,
    pub message: String,
    /// Structured fields in key order.
    pub fields: BTreeMap<String, String>,
    /// Name of the innermost span, if any.
    pub span: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            span: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_span(mut self, span: impl Into<String>) -> Self {
        self.span = Some(span.into());
        self
    }
}

impl fmt::Display for LogEntry {
    /// Single-line rendering: `[LEVEL] target: message key=value ...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level.as_str(), self.target, self.message)?;
        for (key, value) in &self.fields {
            write!(f, " {key}={value}")?;
        }
        Ok(())
    }
}

/// Forwards structured logs from the core to a host logging pipeline
/// (Logcat through the native bridge, the browser console, stdout).
///
/// Sinks receive values that have already been through redaction; they must
/// not add tokens or profile data of their own.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LoggerSink: PlatformSendSync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    /// Entries below this level are dropped before reaching the sink.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

/// Sink writing one line per entry to stdout. Useful for desktop development.
#[derive(Debug, Clone)]
pub struct StdoutLoggerSink {
    pub min_level: LogLevel,
}

impl Default for StdoutLoggerSink {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl LoggerSink for StdoutLoggerSink {
    async fn log(&self, entry: LogEntry) -> Result<()> {
        if entry.level >= self.min_level {
            println!(
                "{} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                entry
            );
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_millis_match() {
        let clock = SystemClock;
        let before = Utc::now().timestamp_millis();
        let millis = clock.unix_timestamp_millis();
        assert!(millis >= before);
    }

    #[test]
    fn test_log_entry_display_orders_fields() {
        let entry = LogEntry::new(LogLevel::Warn, "core_bridge::facade", "vibrate failed")
            .with_field("error", "boom")
            .with_field("capability", "vibrate")
            .with_span("capability");

        assert_eq!(
            entry.to_string(),
            "[WARN] core_bridge::facade: vibrate failed capability=vibrate error=boom"
        );
        assert_eq!(entry.span.as_deref(), Some("capability"));
    }

    #[tokio::test]
    async fn test_stdout_sink_accepts_entries() {
        let sink = StdoutLoggerSink::default();
        let entry = LogEntry::new(LogLevel::Info, "test", "hello");
        assert!(sink.log(entry).await.is_ok());
        assert_eq!(sink.min_level(), LogLevel::Info);
    }
}
