//! Integration tests for logging system

use async_trait::async_trait;
use bridge_traits::error::Result as SinkResult;
use bridge_traits::time::{LogEntry, LogLevel, LoggerSink};
use core_runtime::logging::{
    default_filter_directives, init_logging, redact_if_sensitive, LogFormat, LoggingConfig,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct CapturingSink {
    entries: Mutex<Vec<LogEntry>>,
}

#[async_trait]
impl LoggerSink for CapturingSink {
    async fn log(&self, entry: LogEntry) -> SinkResult<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }

    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}

#[test]
fn test_logging_config_builder() {
    // Only one subscriber can be installed per process, so most checks stay
    // on the config builder.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Json)
        .with_level(LogLevel::Debug)
        .with_pii_redaction(true)
        .with_spans(true);

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, LogLevel::Debug);
    assert!(config.redact_pii);
    assert!(config.enable_spans);
}

#[test]
fn test_pii_redaction_tokens() {
    assert_eq!(redact_if_sensitive("access_token", "abc"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("token", "eyJhbGciOi"), "[REDACTED]");
    assert_eq!(redact_if_sensitive("password", "hunter2"), "[REDACTED]");
    assert_eq!(
        redact_if_sensitive("header", "Bearer eyJhbGciOi"),
        "Bearer [REDACTED]"
    );
}

#[test]
fn test_pii_redaction_emails() {
    let redacted = redact_if_sensitive("email", "jiwoo@ecolife.kr");

    assert!(redacted.starts_with('j'));
    assert!(redacted.contains("[REDACTED]"));
    assert!(!redacted.contains("ecolife.kr"));
}

#[test]
fn test_pii_redaction_normal_values() {
    assert_eq!(redact_if_sensitive("capability", "vibrate"), "vibrate");
    assert_eq!(redact_if_sensitive("key", "userProfile"), "userProfile");
    assert_eq!(redact_if_sensitive("user_id", "42"), "42");
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[cfg(not(debug_assertions))]
    {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Json);
    }
}

#[test]
fn test_default_directives_cover_workspace() {
    let directives = default_filter_directives(LogLevel::Warn);

    for target in ["core_bridge", "core_storage", "core_auth", "bridge_wasm"] {
        assert!(
            directives.contains(&format!("{target}=warn")),
            "missing directive for {target}: {directives}"
        );
    }
    assert!(directives.ends_with("sqlx=warn"));
}

#[test]
fn test_config_chaining() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn)
        .with_filter("core_bridge=debug,core_auth=trace")
        .with_pii_redaction(false)
        .with_spans(false)
        .with_target(false)
        .with_thread_info(true);

    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.level, LogLevel::Warn);
    assert_eq!(
        config.filter.as_deref(),
        Some("core_bridge=debug,core_auth=trace")
    );
    assert!(!config.redact_pii);
    assert!(!config.enable_spans);
    assert!(!config.display_target);
    assert!(config.display_thread_info);
}

#[tokio::test]
async fn test_global_subscriber_forwards_to_sink() {
    let sink = Arc::new(CapturingSink::default());
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_filter("logging_integration=info")
        .with_logger_sink(sink.clone())
        .with_pii_redaction(true);

    init_logging(config).expect("first init succeeds");

    tracing::info!(key = "userProfile", token = "secret-value", "persisted value saved");
    tracing::debug!("below the sink threshold");

    tokio::time::sleep(Duration::from_millis(50)).await;

    let entries = sink.entries.lock().unwrap().clone();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "persisted value saved");
    assert_eq!(entries[0].fields.get("key").map(String::as_str), Some("userProfile"));
    assert_eq!(entries[0].fields.get("token").map(String::as_str), Some("[REDACTED]"));

    let second = init_logging(LoggingConfig::default());
    assert!(second.is_err());
}
