//! Event-tap infrastructure: the system-wide keyboard interceptor.
//!
//! On macOS, this installs a CGEventTap for key-down, key-up, and
//! flags-changed events on a dedicated run-loop thread.  The tap callback
//! must answer suppress-or-forward synchronously within the OS's per-event
//! budget, so it does nothing beyond an atomic load and the pure policy
//! decision from `cleaner_core`.
//!
//! # Testability
//!
//! The `EventInterceptor` trait allows unit and integration tests to install
//! a [`mock::MockInterceptor`] and drive synthetic events through the same
//! decision path without OS hooks or permissions.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub mod mock;

#[cfg(target_os = "macos")]
pub mod macos;

/// Error type for interceptor installation.
///
/// Installation can fail even when the Accessibility permission is granted
/// (the OS may refuse the tap); every variant leaves the session idle and is
/// reported to the user as a retryable warning.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("the OS refused to create the event tap: {0}")]
    TapCreationFailed(String),
    #[error("the event tap was created but could not be enabled")]
    TapNotEnabled,
    #[error("the tap thread terminated before reporting readiness")]
    TapThreadDied,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(&'static str),
}

/// Trait abstracting installation of the system-wide keyboard interceptor.
///
/// The production implementation is [`macos::MacosEventTap`]; tests use
/// [`mock::MockInterceptor`].
pub trait EventInterceptor: Send + Sync {
    /// Installs the interceptor and returns the handle owning its resources.
    ///
    /// The callback reads `active` with acquire ordering on every delivered
    /// event and suppresses keyboard events only while it is `true`; the
    /// writer publishes toggles with release ordering.
    fn install(
        &self,
        active: Arc<AtomicBool>,
    ) -> Result<Box<dyn InterceptorHandle>, InstallError>;
}

/// Owned handle to one live interceptor installation.
///
/// At most one handle is live per process at any instant; the session
/// manager enforces this by tearing down the previous handle before every
/// install.
pub trait InterceptorHandle: Send {
    /// Disables event delivery and releases the OS resources.
    ///
    /// Callers must clear the shared active flag *before* invoking shutdown,
    /// so the callback only forwards events while the resource winds down
    /// (disable-then-release ordering).
    fn shutdown(self: Box<Self>);
}
