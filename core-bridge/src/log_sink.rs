use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};

use crate::facade::AndroidApi;

/// Forwards log entries to the shell's `log` primitive (Logcat on Android).
///
/// Entries are dropped silently while no bridge is attached.
pub struct BridgeLogSink {
    api: Arc<AndroidApi>,
    min_level: LogLevel,
}

impl BridgeLogSink {
    pub fn new(api: Arc<AndroidApi>) -> Self {
        Self {
            api,
            min_level: LogLevel::Info,
        }
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LoggerSink for BridgeLogSink {
    async fn log(&self, entry: LogEntry) -> bridge_traits::error::Result<()> {
        if self.api.is_available() {
            self.api.log(&entry.to_string());
        }
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        self.min_level
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use bridge_desktop::{NativeCall, RecordingBridge, SlotProvider};
    use bridge_traits::{BridgeProvider, SystemClock};

    #[tokio::test]
    async fn test_forwards_formatted_entry() {
        let bridge = Arc::new(RecordingBridge::new());
        let provider: Arc<dyn BridgeProvider> =
            Arc::new(SlotProvider::with_bridge("window.Android", bridge.clone()));
        let api = Arc::new(AndroidApi::new(vec![provider], Arc::new(SystemClock)));
        let sink = BridgeLogSink::new(api).with_min_level(LogLevel::Warn);

        sink.log(LogEntry::new(LogLevel::Warn, "core_auth", "session incomplete"))
            .await
            .unwrap();

        assert_eq!(sink.min_level(), LogLevel::Warn);
        match bridge.last_call() {
            Some(NativeCall::Log(line)) => {
                assert!(line.contains("core_auth"));
                assert!(line.contains("session incomplete"));
            }
            other => panic!("expected a log call, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_without_bridge_is_a_no_op() {
        let api = Arc::new(AndroidApi::new(Vec::new(), Arc::new(SystemClock)));
        let sink = BridgeLogSink::new(api);

        sink.log(LogEntry::new(LogLevel::Error, "core_bridge", "dropped"))
            .await
            .unwrap();
    }
}
