//! Session and permission state types.
//!
//! # Session lifecycle (for beginners)
//!
//! The blocking session is a two-state machine:
//!
//! ```text
//! Idle  ──start() [permission granted, tap installed]──►  Active
//! Idle  ◄──────────────────stop()─────────────────────── Active
//! ```
//!
//! - `Idle`: no interceptor installed; every input event reaches the system.
//! - `Active`: the event tap is live and suppressing all keyboard events.
//!
//! `start()` under a missing permission or a failed installation leaves the
//! session `Idle` — there is no intermediate or error state to recover from.

use serde::{Deserialize, Serialize};

/// Current phase of the blocking session.
///
/// This enum drives the UI toggle rendering: the button label, the keyboard
/// illustration state, and the timer visibility all key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No interceptor installed; all input flows normally.
    Idle,
    /// Interceptor installed and suppressing keyboard events.
    Active,
}

impl SessionPhase {
    /// Returns `true` for [`SessionPhase::Active`].
    pub fn is_active(self) -> bool {
        matches!(self, SessionPhase::Active)
    }
}

/// Snapshot of the OS Accessibility trust status.
///
/// Queried fresh on every start attempt — never cached across attempts,
/// because the user can grant or revoke the permission in System Settings
/// while the app is backgrounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    /// The process is trusted; an event tap may be installed.
    Granted,
    /// The process is not trusted and no prompt is outstanding.
    Denied,
    /// A permission request was issued; the system prompt may still be on
    /// screen and the user has not acted yet.
    PendingUserAction,
}

impl PermissionState {
    /// Returns `true` for [`PermissionState::Granted`].
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionState::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_phase_is_active() {
        assert!(SessionPhase::Active.is_active());
        assert!(!SessionPhase::Idle.is_active());
    }

    #[test]
    fn test_permission_state_is_granted_only_for_granted() {
        assert!(PermissionState::Granted.is_granted());
        assert!(!PermissionState::Denied.is_granted());
        assert!(!PermissionState::PendingUserAction.is_granted());
    }

    #[test]
    fn test_session_phase_serializes_snake_case() {
        let json = serde_json::to_string(&SessionPhase::Active).unwrap();
        assert_eq!(json, "\"active\"");
    }
}
