//! Accessibility permission infrastructure.
//!
//! Installing a blocking event tap requires the user to have trusted the
//! process under System Settings > Privacy & Security > Accessibility.  The
//! permission can change out-of-band at any time (the user flips the toggle
//! while the app is backgrounded), so callers must query it fresh before
//! every start attempt rather than caching a previous answer.

use cleaner_core::PermissionState;

pub mod mock;

#[cfg(target_os = "macos")]
pub mod macos;

/// Error type for permission-guidance operations.
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
    #[error("failed to open the system settings pane: {0}")]
    SettingsOpenFailed(#[source] std::io::Error),
}

/// Trait abstracting the OS permission primitives.
///
/// The production implementation is [`macos::MacosPermissionGate`]; tests
/// use [`mock::MockPermissionGate`].
pub trait PermissionGate: Send + Sync {
    /// Returns the current trust status.  Always a fresh query.
    fn query(&self) -> PermissionState;

    /// Asks the OS to prompt the user for the permission.
    ///
    /// The system prompt (if any) is shown asynchronously; this returns
    /// immediately and the caller re-queries later to observe the outcome.
    fn request(&self);

    /// Opens the OS settings screen where the permission is granted.
    fn open_settings(&self) -> Result<(), PermissionError>;
}
