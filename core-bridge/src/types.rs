//! Option and result shapes of the façade's capabilities.

use bridge_traits::BridgeError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Outcome of a capability call. Failures are values, never panics.
pub type CapabilityResult<T> = Result<T, BridgeError>;

/// Vibration length used when neither a duration nor a pattern is given.
pub const DEFAULT_VIBRATION_MS: u32 = 200;

/// Title passed to the share sheet when the caller supplies none.
pub const DEFAULT_SHARE_TITLE: &str = "Share";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibrationOptions {
    #[serde(rename = "duration")]
    pub duration_ms: Option<u32>,
    /// Alternating off/on timings in milliseconds. Takes precedence over
    /// `duration_ms` when non-empty.
    #[serde(default)]
    pub pattern: Vec<u32>,
}

impl VibrationOptions {
    pub fn duration(ms: u32) -> Self {
        Self {
            duration_ms: Some(ms),
            pattern: Vec::new(),
        }
    }

    pub fn pattern(pattern: impl Into<Vec<u32>>) -> Self {
        Self {
            duration_ms: None,
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastDuration {
    #[default]
    Short,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastOptions {
    pub message: String,
    #[serde(default)]
    pub duration: ToastDuration,
}

impl ToastOptions {
    pub fn short(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            duration: ToastDuration::Short,
        }
    }

    pub fn long(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            duration: ToastDuration::Long,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareData {
    pub text: String,
    pub title: Option<String>,
}

impl ShareData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_SHARE_TITLE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardData {
    pub text: String,
    /// When the clipboard was read.
    pub timestamp: DateTime<Utc>,
}

/// Requested screen brightness; any `i32` is accepted and clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrightnessConfig {
    pub level: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub brightness: i32,
    pub location_enabled: bool,
}

/// Result shape of the storage capabilities.
///
/// `data` carries the decoded value on success and the caller's default when
/// the key is absent or the read failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> StorageResult<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: false,
            data,
            error: Some(error.into()),
        }
    }
}

impl StorageResult<()> {
    pub fn done() -> Self {
        Self::ok(None)
    }
}

/// Clamps any integer into the native 0..=255 brightness range.
pub fn clamp_brightness(level: i32) -> u8 {
    level.clamp(0, 255) as u8
}

/// `[100, 50, 100]` becomes `"100,50,100"`.
pub fn format_vibration_pattern(pattern: &[u32]) -> String {
    pattern
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses `raw` as JSON, returning `fallback` on any error.
pub fn safe_json_parse<T: DeserializeOwned>(raw: &str, fallback: T) -> T {
    serde_json::from_str(raw).unwrap_or(fallback)
}
