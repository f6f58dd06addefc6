//! Logging system demonstration
//!
//! Shows what the core's diagnostics look like in each output format, and how
//! entries are mirrored to a host sink.
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run --example logging_demo
//!
//! # JSON format
//! cargo run --example logging_demo -- json
//!
//! # Compact format with a custom filter
//! cargo run --example logging_demo -- compact "logging_demo=trace"
//! ```

use std::env;
use std::sync::Arc;

use bridge_traits::time::{LogLevel, StdoutLoggerSink};
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LoggingConfig};
use tracing::{debug, info, instrument, span, warn, Level};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Debug)
        .with_pii_redaction(true)
        .with_target(true)
        .with_logger_sink(Arc::new(StdoutLoggerSink {
            min_level: LogLevel::Warn,
        }))
        .with_filter(
            args.get(2)
                .cloned()
                .unwrap_or_else(|| "logging_demo=debug".to_string()),
        );

    if let Err(e) = init_logging(config) {
        eprintln!("Failed to initialize logging: {e}");
        return;
    }

    info!(format = ?format, "Logging initialized");

    demo_bridge_probe();
    demo_capability_failure();
    demo_session().await;
}

fn demo_bridge_probe() {
    let span = span!(Level::INFO, "bridge_probe");
    let _enter = span.enter();

    debug!(provider = "window.Android", "No bridge at injection point");
    info!(provider = "window.EcoLifeApp.AndroidBridge", "Native bridge attached");
}

fn demo_capability_failure() {
    // Warn and above also reach the stdout sink.
    warn!(
        capability = "getFromClipboard",
        error = "Native call getFromClipboard failed: SecurityException",
        "Capability failed"
    );
}

#[instrument]
async fn demo_session() {
    let token = "eyJhbGciOiJIUzI1NiJ9.payload.signature";
    let email = "eco@example.com";

    info!(
        token = %redact_if_sensitive("token", token),
        email = %redact_if_sensitive("email", email),
        "Values that must never be logged verbatim"
    );

    tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    info!(user_id = "u-42", "User signed in");
}
