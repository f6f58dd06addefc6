//! [`NativeBridge`] over the JavaScript object the Android shell injects.
//!
//! Every primitive is looked up by its host name with `Reflect::get` and
//! invoked with the bridge object as `this`. Anything the host throws comes
//! back as [`BridgeError::NativeCall`].

use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{NativeBridge, NavigationPageId};
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::error::{js_error_message, WasmError};

/// Handle to an injected `AndroidBridge`-shaped object.
#[derive(Clone, Debug)]
pub struct JsNativeBridge {
    target: JsValue,
}

impl JsNativeBridge {
    /// Wraps an already located bridge object.
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    /// The wrapped JavaScript object.
    pub fn target(&self) -> &JsValue {
        &self.target
    }

    fn method(&self, name: &str) -> Result<Function, WasmError> {
        Reflect::get(&self.target, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| WasmError::MissingMethod(name.to_string()))
    }

    fn call(&self, name: &str, args: &[JsValue]) -> BridgeResult<JsValue> {
        let function = self.method(name)?;
        let js_args: Array = args.iter().collect();
        function
            .apply(&self.target, &js_args)
            .map_err(|err| BridgeError::native_call(name, js_error_message(&err)))
    }

    fn call_unit(&self, name: &str, args: &[JsValue]) -> BridgeResult<()> {
        self.call(name, args).map(|_| ())
    }

    fn call_string(&self, name: &str, args: &[JsValue]) -> BridgeResult<Option<String>> {
        let value = self.call(name, args)?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        value.as_string().map(Some).ok_or_else(|| {
            WasmError::UnexpectedType {
                method: name.to_string(),
                expected: "string",
            }
            .into()
        })
    }
}

fn text(value: &str) -> JsValue {
    JsValue::from_str(value)
}

impl NativeBridge for JsNativeBridge {
    fn vibrate(&self, duration_ms: u32) -> BridgeResult<()> {
        self.call_unit("vibrate", &[JsValue::from(duration_ms)])
    }

    fn vibrate_pattern(&self, pattern: &str) -> BridgeResult<()> {
        self.call_unit("vibratePattern", &[text(pattern)])
    }

    fn show_toast(&self, message: &str) -> BridgeResult<()> {
        self.call_unit("showToast", &[text(message)])
    }

    fn show_long_toast(&self, message: &str) -> BridgeResult<()> {
        self.call_unit("showLongToast", &[text(message)])
    }

    fn show_notification(&self, title: &str, message: &str) -> BridgeResult<()> {
        self.call_unit("showNotification", &[text(title), text(message)])
    }

    fn copy_to_clipboard(&self, value: &str) -> BridgeResult<()> {
        self.call_unit("copyToClipboard", &[text(value)])
    }

    fn get_from_clipboard(&self) -> BridgeResult<String> {
        Ok(self
            .call_string("getFromClipboard", &[])?
            .unwrap_or_default())
    }

    fn share(&self, value: &str, title: &str) -> BridgeResult<()> {
        self.call_unit("share", &[text(value), text(title)])
    }

    fn get_screen_brightness(&self) -> BridgeResult<i32> {
        let value = self.call("getScreenBrightness", &[])?;
        value.as_f64().map(|level| level as i32).ok_or_else(|| {
            WasmError::UnexpectedType {
                method: "getScreenBrightness".to_string(),
                expected: "number",
            }
            .into()
        })
    }

    fn set_screen_brightness(&self, brightness: u8) -> BridgeResult<()> {
        self.call_unit("setScreenBrightness", &[JsValue::from(brightness)])
    }

    fn is_location_enabled(&self) -> BridgeResult<bool> {
        let value = self.call("isLocationEnabled", &[])?;
        // Some WebView builds hand booleans back as "true" / "false".
        match (value.as_bool(), value.as_string().as_deref()) {
            (Some(enabled), _) => Ok(enabled),
            (None, Some("true")) => Ok(true),
            (None, Some("false")) => Ok(false),
            _ => Err(WasmError::UnexpectedType {
                method: "isLocationEnabled".to_string(),
                expected: "boolean",
            }
            .into()),
        }
    }

    fn finish_app(&self) -> BridgeResult<()> {
        self.call_unit("finishApp", &[])
    }

    fn restart_app(&self) -> BridgeResult<()> {
        self.call_unit("restartApp", &[])
    }

    fn log(&self, message: &str) -> BridgeResult<()> {
        self.call_unit("log", &[text(message)])
    }

    fn save_to_storage(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.call_unit("saveToStorage", &[text(key), text(value)])
    }

    fn get_from_storage(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self
            .call_string("getFromStorage", &[text(key)])?
            .filter(|value| !value.is_empty()))
    }

    fn remove_from_storage(&self, key: &str) -> BridgeResult<()> {
        self.call_unit("removeFromStorage", &[text(key)])
    }

    fn clear_storage(&self) -> BridgeResult<()> {
        self.call_unit("clearStorage", &[])
    }

    fn update_bottom_navigation(&self, page: NavigationPageId) -> BridgeResult<()> {
        self.call_unit("updateBottomNavigation", &[text(page.as_str())])
    }

    fn reset_fab(&self) -> BridgeResult<()> {
        self.call_unit("resetFabFromBridge", &[])
    }

    fn hide_bottom_navigation(&self) -> BridgeResult<()> {
        self.call_unit("hideBottomNavigation", &[])
    }

    fn show_bottom_navigation(&self) -> BridgeResult<()> {
        self.call_unit("showBottomNavigation", &[])
    }
}
