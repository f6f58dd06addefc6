//! The native capability object injected by the Android WebView shell.
//!
//! The host exposes a flat set of synchronous methods on a global object.
//! [`NativeBridge`] mirrors that surface one-to-one so the façade can treat a
//! JavaScript handle, a test double or any other host integration the same
//! way. Every method returns a [`Result`] because any native call may raise;
//! converting those failures into values is the façade's job, not the
//! adapter's.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BridgeError, Result};
use crate::platform::PlatformSendSync;

/// Synchronous native primitives exposed by the host shell.
///
/// Method names follow the host contract (`vibratePattern`, `showLongToast`,
/// `resetFabFromBridge`, ...). Implementations must not retry or swallow
/// errors.
pub trait NativeBridge: PlatformSendSync {
    fn vibrate(&self, duration_ms: u32) -> Result<()>;

    /// `pattern` is a comma separated list of millisecond timings.
    fn vibrate_pattern(&self, pattern: &str) -> Result<()>;

    fn show_toast(&self, message: &str) -> Result<()>;

    fn show_long_toast(&self, message: &str) -> Result<()>;

    fn show_notification(&self, title: &str, message: &str) -> Result<()>;

    fn copy_to_clipboard(&self, text: &str) -> Result<()>;

    fn get_from_clipboard(&self) -> Result<String>;

    fn share(&self, text: &str, title: &str) -> Result<()>;

    fn get_screen_brightness(&self) -> Result<i32>;

    fn set_screen_brightness(&self, brightness: u8) -> Result<()>;

    fn is_location_enabled(&self) -> Result<bool>;

    fn finish_app(&self) -> Result<()>;

    fn restart_app(&self) -> Result<()>;

    fn log(&self, message: &str) -> Result<()>;

    fn save_to_storage(&self, key: &str, value: &str) -> Result<()>;

    /// Returns `None` when the host reports no value (null or empty string).
    fn get_from_storage(&self, key: &str) -> Result<Option<String>>;

    fn remove_from_storage(&self, key: &str) -> Result<()>;

    fn clear_storage(&self) -> Result<()>;

    fn update_bottom_navigation(&self, page: NavigationPageId) -> Result<()>;

    /// Host method `resetFabFromBridge`.
    fn reset_fab(&self) -> Result<()>;

    fn hide_bottom_navigation(&self) -> Result<()>;

    fn show_bottom_navigation(&self) -> Result<()>;
}

/// Bottom-navigation tab identifiers understood by the native chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationPageId {
    Home,
    Ranking,
    Missions,
    Map,
    My,
}

impl NavigationPageId {
    pub const ALL: [NavigationPageId; 5] = [
        NavigationPageId::Home,
        NavigationPageId::Ranking,
        NavigationPageId::Missions,
        NavigationPageId::Map,
        NavigationPageId::My,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationPageId::Home => "home",
            NavigationPageId::Ranking => "ranking",
            NavigationPageId::Missions => "missions",
            NavigationPageId::Map => "map",
            NavigationPageId::My => "my",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.as_str() == value)
    }
}

impl fmt::Display for NavigationPageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavigationPageId {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| BridgeError::Decode(format!("unknown page id: {s}")))
    }
}

/// Checks whether a route segment names one of the bottom-navigation tabs.
pub fn is_valid_page_id(value: &str) -> bool {
    NavigationPageId::parse(value).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_round_trips_through_str() {
        for page in NavigationPageId::ALL {
            assert_eq!(page.as_str().parse::<NavigationPageId>(), Ok(page));
        }
    }

    #[test]
    fn test_page_id_validation() {
        assert!(is_valid_page_id("missions"));
        assert!(is_valid_page_id("my"));
        assert!(!is_valid_page_id("settings"));
        assert!(!is_valid_page_id("Home"));
        assert!("chat".parse::<NavigationPageId>().is_err());
    }

    #[test]
    fn test_page_id_serde_uses_lowercase() {
        let json = serde_json::to_string(&NavigationPageId::Ranking).unwrap();
        assert_eq!(json, "\"ranking\"");
    }
}
