//! macOS Accessibility trust gate.
//!
//! Query and request go through the ApplicationServices `AXIsProcessTrusted`
//! family.  `AXIsProcessTrustedWithOptions` with the prompt option shows the
//! system permission dialog at most once per launch; subsequent grants
//! happen in System Settings, which is why guidance deep-links there.

#![cfg(target_os = "macos")]

use std::process::Command;

use core_foundation::base::TCFType;
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::{CFDictionary, CFDictionaryRef};
use core_foundation::string::{CFString, CFStringRef};
use tracing::{debug, warn};

use cleaner_core::PermissionState;

use super::{PermissionError, PermissionGate};

#[link(name = "ApplicationServices", kind = "framework")]
extern "C" {
    fn AXIsProcessTrusted() -> bool;
    fn AXIsProcessTrustedWithOptions(options: CFDictionaryRef) -> bool;
    static kAXTrustedCheckOptionPrompt: CFStringRef;
}

/// Deep link into System Settings > Privacy & Security > Accessibility.
/// Works on macOS 13+ and on the older System Preferences alike.
const ACCESSIBILITY_SETTINGS_URL: &str =
    "x-apple.systempreferences:com.apple.preference.security?Privacy_Accessibility";

/// Final fallback when the URL scheme is not handled.
const SECURITY_PREFPANE_PATH: &str = "/System/Library/PreferencePanes/Security.prefPane";

/// Production Accessibility gate.
#[derive(Debug, Default)]
pub struct MacosPermissionGate;

impl MacosPermissionGate {
    pub fn new() -> Self {
        Self
    }
}

impl PermissionGate for MacosPermissionGate {
    fn query(&self) -> PermissionState {
        if unsafe { AXIsProcessTrusted() } {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        }
    }

    fn request(&self) {
        let key = unsafe { CFString::wrap_under_get_rule(kAXTrustedCheckOptionPrompt) };
        let options = CFDictionary::from_CFType_pairs(&[(
            key.as_CFType(),
            CFBoolean::true_value().as_CFType(),
        )]);
        let trusted = unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef()) };
        debug!(trusted, "accessibility permission requested with prompt");
    }

    fn open_settings(&self) -> Result<(), PermissionError> {
        let status = Command::new("/usr/bin/open")
            .arg(ACCESSIBILITY_SETTINGS_URL)
            .status()
            .map_err(PermissionError::SettingsOpenFailed)?;

        if status.success() {
            return Ok(());
        }

        warn!("settings URL scheme rejected; opening the Security preference pane directly");
        Command::new("/usr/bin/open")
            .arg(SECURITY_PREFPANE_PATH)
            .status()
            .map_err(PermissionError::SettingsOpenFailed)?;
        Ok(())
    }
}
