//! Browser console as a [`LoggerSink`].

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{LogEntry, LogLevel, LoggerSink};
use wasm_bindgen::JsValue;

/// Writes entries to `console.*` with the matching severity.
#[derive(Debug, Clone)]
pub struct ConsoleLoggerSink {
    min_level: LogLevel,
}

impl ConsoleLoggerSink {
    /// Sink that drops entries below `min_level`.
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Default for ConsoleLoggerSink {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

#[async_trait(?Send)]
impl LoggerSink for ConsoleLoggerSink {
    async fn log(&self, entry: LogEntry) -> BridgeResult<()> {
        let line = JsValue::from_str(&entry.to_string());
        match entry.level {
            LogLevel::Error => web_sys::console::error_1(&line),
            LogLevel::Warn => web_sys::console::warn_1(&line),
            LogLevel::Info => web_sys::console::info_1(&line),
            LogLevel::Debug | LogLevel::Trace => web_sys::console::debug_1(&line),
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}
