//! Scriptable [`NativeBridge`] double.

use bridge_traits::{
    error::{BridgeError, Result},
    native::{NativeBridge, NavigationPageId},
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// A primitive invocation as the host shell would have received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeCall {
    Vibrate(u32),
    VibratePattern(String),
    ShowToast(String),
    ShowLongToast(String),
    ShowNotification { title: String, message: String },
    CopyToClipboard(String),
    GetFromClipboard,
    Share { text: String, title: String },
    GetScreenBrightness,
    SetScreenBrightness(u8),
    IsLocationEnabled,
    FinishApp,
    RestartApp,
    Log(String),
    SaveToStorage { key: String, value: String },
    GetFromStorage(String),
    RemoveFromStorage(String),
    ClearStorage,
    UpdateBottomNavigation(NavigationPageId),
    ResetFab,
    HideBottomNavigation,
    ShowBottomNavigation,
}

impl NativeCall {
    /// Host method name of the primitive.
    pub fn method(&self) -> &'static str {
        match self {
            NativeCall::Vibrate(_) => "vibrate",
            NativeCall::VibratePattern(_) => "vibratePattern",
            NativeCall::ShowToast(_) => "showToast",
            NativeCall::ShowLongToast(_) => "showLongToast",
            NativeCall::ShowNotification { .. } => "showNotification",
            NativeCall::CopyToClipboard(_) => "copyToClipboard",
            NativeCall::GetFromClipboard => "getFromClipboard",
            NativeCall::Share { .. } => "share",
            NativeCall::GetScreenBrightness => "getScreenBrightness",
            NativeCall::SetScreenBrightness(_) => "setScreenBrightness",
            NativeCall::IsLocationEnabled => "isLocationEnabled",
            NativeCall::FinishApp => "finishApp",
            NativeCall::RestartApp => "restartApp",
            NativeCall::Log(_) => "log",
            NativeCall::SaveToStorage { .. } => "saveToStorage",
            NativeCall::GetFromStorage(_) => "getFromStorage",
            NativeCall::RemoveFromStorage(_) => "removeFromStorage",
            NativeCall::ClearStorage => "clearStorage",
            NativeCall::UpdateBottomNavigation(_) => "updateBottomNavigation",
            NativeCall::ResetFab => "resetFabFromBridge",
            NativeCall::HideBottomNavigation => "hideBottomNavigation",
            NativeCall::ShowBottomNavigation => "showBottomNavigation",
        }
    }
}

#[derive(Default)]
struct Script {
    clipboard: String,
    brightness: i32,
    location_enabled: bool,
    storage: HashMap<String, String>,
    failing: HashSet<&'static str>,
}

/// In-process stand-in for the Android shell.
///
/// Records every call, keeps clipboard, brightness and storage state the way
/// the shell would, and raises [`BridgeError::NativeCall`] for any method
/// marked with [`fail_on`](Self::fail_on).
#[derive(Default)]
pub struct RecordingBridge {
    calls: Mutex<Vec<NativeCall>>,
    script: Mutex<Script>,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named host method (e.g. `"getFromClipboard"`) raise.
    pub fn fail_on(&self, method: &'static str) {
        self.script.lock().failing.insert(method);
    }

    pub fn clear_failures(&self) {
        self.script.lock().failing.clear();
    }

    pub fn set_clipboard(&self, text: impl Into<String>) {
        self.script.lock().clipboard = text.into();
    }

    pub fn set_brightness(&self, level: i32) {
        self.script.lock().brightness = level;
    }

    pub fn set_location_enabled(&self, enabled: bool) {
        self.script.lock().location_enabled = enabled;
    }

    /// Seeds native storage without recording a call.
    pub fn seed_storage(&self, key: impl Into<String>, value: impl Into<String>) {
        self.script.lock().storage.insert(key.into(), value.into());
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.script.lock().storage.get(key).cloned()
    }

    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<NativeCall> {
        self.calls.lock().last().cloned()
    }

    pub fn take_calls(&self) -> Vec<NativeCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    fn record(&self, call: NativeCall) -> Result<()> {
        let method = call.method();
        self.calls.lock().push(call);
        if self.script.lock().failing.contains(method) {
            return Err(BridgeError::native_call(method, "scripted failure"));
        }
        Ok(())
    }
}

impl NativeBridge for RecordingBridge {
    fn vibrate(&self, duration_ms: u32) -> Result<()> {
        self.record(NativeCall::Vibrate(duration_ms))
    }

    fn vibrate_pattern(&self, pattern: &str) -> Result<()> {
        self.record(NativeCall::VibratePattern(pattern.to_string()))
    }

    fn show_toast(&self, message: &str) -> Result<()> {
        self.record(NativeCall::ShowToast(message.to_string()))
    }

    fn show_long_toast(&self, message: &str) -> Result<()> {
        self.record(NativeCall::ShowLongToast(message.to_string()))
    }

    fn show_notification(&self, title: &str, message: &str) -> Result<()> {
        self.record(NativeCall::ShowNotification {
            title: title.to_string(),
            message: message.to_string(),
        })
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        self.record(NativeCall::CopyToClipboard(text.to_string()))?;
        self.script.lock().clipboard = text.to_string();
        Ok(())
    }

    fn get_from_clipboard(&self) -> Result<String> {
        self.record(NativeCall::GetFromClipboard)?;
        Ok(self.script.lock().clipboard.clone())
    }

    fn share(&self, text: &str, title: &str) -> Result<()> {
        self.record(NativeCall::Share {
            text: text.to_string(),
            title: title.to_string(),
        })
    }

    fn get_screen_brightness(&self) -> Result<i32> {
        self.record(NativeCall::GetScreenBrightness)?;
        Ok(self.script.lock().brightness)
    }

    fn set_screen_brightness(&self, brightness: u8) -> Result<()> {
        self.record(NativeCall::SetScreenBrightness(brightness))?;
        self.script.lock().brightness = i32::from(brightness);
        Ok(())
    }

    fn is_location_enabled(&self) -> Result<bool> {
        self.record(NativeCall::IsLocationEnabled)?;
        Ok(self.script.lock().location_enabled)
    }

    fn finish_app(&self) -> Result<()> {
        self.record(NativeCall::FinishApp)
    }

    fn restart_app(&self) -> Result<()> {
        self.record(NativeCall::RestartApp)
    }

    fn log(&self, message: &str) -> Result<()> {
        self.record(NativeCall::Log(message.to_string()))
    }

    fn save_to_storage(&self, key: &str, value: &str) -> Result<()> {
        self.record(NativeCall::SaveToStorage {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        self.script
            .lock()
            .storage
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_from_storage(&self, key: &str) -> Result<Option<String>> {
        self.record(NativeCall::GetFromStorage(key.to_string()))?;
        Ok(self
            .script
            .lock()
            .storage
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned())
    }

    fn remove_from_storage(&self, key: &str) -> Result<()> {
        self.record(NativeCall::RemoveFromStorage(key.to_string()))?;
        self.script.lock().storage.remove(key);
        Ok(())
    }

    fn clear_storage(&self) -> Result<()> {
        self.record(NativeCall::ClearStorage)?;
        self.script.lock().storage.clear();
        Ok(())
    }

    fn update_bottom_navigation(&self, page: NavigationPageId) -> Result<()> {
        self.record(NativeCall::UpdateBottomNavigation(page))
    }

    fn reset_fab(&self) -> Result<()> {
        self.record(NativeCall::ResetFab)
    }

    fn hide_bottom_navigation(&self) -> Result<()> {
        self.record(NativeCall::HideBottomNavigation)
    }

    fn show_bottom_navigation(&self) -> Result<()> {
        self.record(NativeCall::ShowBottomNavigation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_calls_in_order() {
        let bridge = RecordingBridge::new();
        bridge.vibrate(200).unwrap();
        bridge.show_toast("saved").unwrap();
        bridge
            .update_bottom_navigation(NavigationPageId::Missions)
            .unwrap();

        assert_eq!(
            bridge.take_calls(),
            vec![
                NativeCall::Vibrate(200),
                NativeCall::ShowToast("saved".into()),
                NativeCall::UpdateBottomNavigation(NavigationPageId::Missions),
            ]
        );
        assert!(bridge.calls().is_empty());
    }

    #[test]
    fn test_scripted_failure_still_records() {
        let bridge = RecordingBridge::new();
        bridge.fail_on("getFromClipboard");

        let err = bridge.get_from_clipboard().unwrap_err();
        assert_eq!(
            err,
            BridgeError::native_call("getFromClipboard", "scripted failure")
        );
        assert_eq!(bridge.last_call(), Some(NativeCall::GetFromClipboard));

        bridge.clear_failures();
        bridge.set_clipboard("copied");
        assert_eq!(bridge.get_from_clipboard().unwrap(), "copied");
    }

    #[test]
    fn test_storage_treats_empty_as_absent() {
        let bridge = RecordingBridge::new();
        bridge.seed_storage("empty", "");
        bridge.save_to_storage("token", "abc").unwrap();

        assert_eq!(bridge.get_from_storage("empty").unwrap(), None);
        assert_eq!(bridge.get_from_storage("token").unwrap().as_deref(), Some("abc"));

        bridge.clear_storage().unwrap();
        assert_eq!(bridge.stored("token"), None);
    }

    #[test]
    fn test_brightness_state() {
        let bridge = RecordingBridge::new();
        bridge.set_screen_brightness(180).unwrap();
        assert_eq!(bridge.get_screen_brightness().unwrap(), 180);
    }
}
