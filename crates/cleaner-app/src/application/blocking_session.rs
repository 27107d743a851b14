//! SessionManager: lifecycle of the system-wide keyboard interceptor.
//!
//! This use case is the heart of the application.  It owns the two-state
//! toggle (`Idle`/`Active`), gates every start on a fresh Accessibility
//! permission query, installs and tears down the interceptor through the
//! [`EventInterceptor`] trait, and schedules the single deferred permission
//! recheck after a prompt.
//!
//! # State machine
//!
//! ```text
//! Idle ──start(), permission granted, install ok──► Active
//! Idle ◄──────────────────stop()────────────────── Active
//! ```
//!
//! `start()` while already `Active` first tears the existing interceptor
//! down and reinstalls, so two interceptors are never live simultaneously.
//! Every failure path leaves the manager `Idle`; there is no error state.
//!
//! # Shared flag ordering
//!
//! The active flag is written here and read by the interceptor callback on
//! the tap's dispatch thread, so toggles are published with release ordering
//! and the callback loads with acquire ordering.  `stop()` clears the flag
//! *before* releasing the interceptor: events still draining through the
//! dying tap are forwarded, never suppressed (disable-then-release).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use cleaner_core::{PermissionState, SessionPhase};

use crate::infrastructure::event_tap::{EventInterceptor, InstallError, InterceptorHandle};
use crate::infrastructure::permissions::PermissionGate;

/// Error type for `start()`.  Both variants are recoverable and leave the
/// session idle; the caller renders them and the user may retry.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("the accessibility permission has not been granted")]
    PermissionRequired,
    #[error("failed to install the keyboard interceptor: {0}")]
    InstallationFailed(#[from] InstallError),
}

/// Out-of-band notification from the deferred permission recheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    /// The recheck found the permission granted; the user can start again.
    PermissionGranted,
    /// Still missing after the prompt; guide the user to System Settings.
    PermissionStillMissing,
}

/// Manages the blocking session: at most one live interceptor per process.
pub struct SessionManager {
    /// Shared with the interceptor callback; see the module docs for the
    /// ordering contract.
    active: Arc<AtomicBool>,
    /// Live interceptor resources.  `Some` iff the session is active.
    handle: Option<Box<dyn InterceptorHandle>>,
    gate: Arc<dyn PermissionGate>,
    interceptor: Arc<dyn EventInterceptor>,
    recheck_delay: Duration,
    /// The single outstanding deferred recheck, if any.  Replaced (not
    /// stacked) by a new prompt and cancelled by `stop()`.
    recheck: Option<tokio::task::JoinHandle<()>>,
    notices: mpsc::UnboundedSender<SessionNotice>,
}

impl SessionManager {
    /// Creates an idle manager and the receiver for its notices.
    pub fn new(
        gate: Arc<dyn PermissionGate>,
        interceptor: Arc<dyn EventInterceptor>,
        recheck_delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SessionNotice>) {
        let (notices, notice_rx) = mpsc::unbounded_channel();
        (
            Self {
                active: Arc::new(AtomicBool::new(false)),
                handle: None,
                gate,
                interceptor,
                recheck_delay,
                recheck: None,
                notices,
            },
            notice_rx,
        )
    }

    /// Starts (or restarts) the blocking session.
    ///
    /// Queries the permission fresh, prompts and schedules one deferred
    /// recheck when it is missing, and otherwise installs the interceptor.
    ///
    /// # Errors
    ///
    /// - [`StartError::PermissionRequired`] – permission missing; the OS
    ///   prompt was triggered and a recheck scheduled.  Session stays idle.
    /// - [`StartError::InstallationFailed`] – the OS refused the interceptor
    ///   despite the permission being granted.  Session stays idle.
    pub fn start(&mut self) -> Result<(), StartError> {
        // Defensive reset: tear down any live interceptor before touching
        // anything else, so a duplicate can never exist.
        self.teardown();

        let permission = self.gate.query();
        if !permission.is_granted() {
            warn!(?permission, "cannot start blocking: permission missing");
            self.gate.request();
            self.schedule_permission_recheck();
            return Err(StartError::PermissionRequired);
        }

        let handle = self.interceptor.install(Arc::clone(&self.active))?;
        self.handle = Some(handle);
        self.active.store(true, Ordering::Release);
        info!("blocking session active; all keyboard input suppressed");
        Ok(())
    }

    /// Stops the blocking session.  Idempotent; stopping an idle session is
    /// a no-op.  Safe to call from teardown paths.
    pub fn stop(&mut self) {
        self.teardown();
    }

    /// Whether the interceptor is installed and suppressing.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// The session phase as a domain value, for status rendering.
    pub fn phase(&self) -> SessionPhase {
        if self.is_active() {
            SessionPhase::Active
        } else {
            SessionPhase::Idle
        }
    }

    /// Tri-state permission snapshot for status rendering: `Granted` from a
    /// fresh query, `PendingUserAction` while a recheck is outstanding, and
    /// `Denied` otherwise.
    pub fn permission_snapshot(&self) -> PermissionState {
        if self.gate.query().is_granted() {
            return PermissionState::Granted;
        }
        let recheck_outstanding = self
            .recheck
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false);
        if recheck_outstanding {
            PermissionState::PendingUserAction
        } else {
            PermissionState::Denied
        }
    }

    fn teardown(&mut self) {
        if let Some(task) = self.recheck.take() {
            task.abort();
        }

        // Publish idle before releasing the tap: the callback only forwards
        // while the OS resource winds down.
        self.active.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.shutdown();
            info!("blocking session stopped; keyboard input restored");
        }
    }

    /// Schedules the single fire-once permission recheck after a prompt.
    ///
    /// A fresh prompt replaces any still-pending recheck rather than
    /// stacking a second one.
    fn schedule_permission_recheck(&mut self) {
        if let Some(task) = self.recheck.take() {
            task.abort();
        }

        let gate = Arc::clone(&self.gate);
        let notices = self.notices.clone();
        let delay = self.recheck_delay;
        self.recheck = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let notice = if gate.query().is_granted() {
                debug!("deferred recheck: permission granted in the meantime");
                SessionNotice::PermissionGranted
            } else {
                debug!("deferred recheck: permission still missing");
                SessionNotice::PermissionStillMissing
            };
            // The receiver may be gone during shutdown; nothing to do then.
            let _ = notices.send(notice);
        }));
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_tap::mock::MockInterceptor;
    use crate::infrastructure::permissions::mock::MockPermissionGate;
    use cleaner_core::{EventDecision, InputEventKind};

    const TEST_RECHECK_DELAY: Duration = Duration::from_millis(10);

    fn make_manager(
        gate: MockPermissionGate,
    ) -> (
        SessionManager,
        mpsc::UnboundedReceiver<SessionNotice>,
        MockInterceptor,
    ) {
        let interceptor = MockInterceptor::new();
        let (manager, rx) = SessionManager::new(
            Arc::new(gate),
            Arc::new(interceptor.clone()),
            TEST_RECHECK_DELAY,
        );
        (manager, rx, interceptor)
    }

    #[tokio::test]
    async fn test_new_manager_is_idle() {
        // Arrange / Act
        let (manager, _rx, interceptor) = make_manager(MockPermissionGate::granted());

        // Assert
        assert!(!manager.is_active());
        assert_eq!(interceptor.live_handles(), 0);
    }

    #[tokio::test]
    async fn test_start_with_granted_permission_activates() {
        // Arrange
        let (mut manager, _rx, interceptor) = make_manager(MockPermissionGate::granted());

        // Act
        manager.start().expect("start must succeed");

        // Assert
        assert!(manager.is_active());
        assert_eq!(interceptor.live_handles(), 1);
        assert_eq!(
            interceptor.feed(InputEventKind::KeyDown),
            EventDecision::Suppress
        );
    }

    #[tokio::test]
    async fn test_start_with_denied_permission_stays_idle_and_prompts() {
        // Arrange
        let gate = MockPermissionGate::denied();
        let (mut manager, _rx, interceptor) = make_manager(gate);

        // Act
        let result = manager.start();

        // Assert
        assert!(matches!(result, Err(StartError::PermissionRequired)));
        assert!(!manager.is_active());
        assert_eq!(interceptor.install_count(), 0);
    }

    #[tokio::test]
    async fn test_repeated_denied_starts_are_state_noops() {
        // Arrange
        let (mut manager, _rx, interceptor) = make_manager(MockPermissionGate::denied());

        // Act
        for _ in 0..3 {
            let _ = manager.start();
        }

        // Assert
        assert!(!manager.is_active());
        assert_eq!(interceptor.live_handles(), 0);
    }

    #[tokio::test]
    async fn test_install_failure_leaves_idle() {
        // Arrange
        let (mut manager, _rx, interceptor) = make_manager(MockPermissionGate::granted());
        interceptor.fail_next_install();

        // Act
        let result = manager.start();

        // Assert
        assert!(matches!(result, Err(StartError::InstallationFailed(_))));
        assert!(!manager.is_active());
        assert_eq!(interceptor.live_handles(), 0);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        // Arrange
        let (mut manager, _rx, interceptor) = make_manager(MockPermissionGate::granted());
        manager.start().expect("start");

        // Act
        manager.stop();
        manager.stop();

        // Assert
        assert!(!manager.is_active());
        assert_eq!(interceptor.live_handles(), 0);
        assert_eq!(
            interceptor.feed(InputEventKind::KeyDown),
            EventDecision::Forward
        );
    }

    #[tokio::test]
    async fn test_duplicate_start_keeps_exactly_one_live_handle() {
        // Arrange
        let (mut manager, _rx, interceptor) = make_manager(MockPermissionGate::granted());

        // Act
        manager.start().expect("first start");
        manager.start().expect("second start");

        // Assert – reinstalled, but never two live at once
        assert_eq!(interceptor.install_count(), 2);
        assert_eq!(interceptor.live_handles(), 1);
        assert!(manager.is_active());
    }

    #[tokio::test]
    async fn test_recheck_reports_still_missing() {
        // Arrange
        let (mut manager, mut rx, _interceptor) = make_manager(MockPermissionGate::denied());

        // Act
        let _ = manager.start();
        let notice = rx.recv().await;

        // Assert
        assert_eq!(notice, Some(SessionNotice::PermissionStillMissing));
    }

    #[tokio::test]
    async fn test_recheck_detects_out_of_band_grant() {
        // Arrange – denied at start time, granted by recheck time
        let gate = MockPermissionGate::denied();
        gate.push_response(PermissionState::Denied); // consumed by start()
        gate.set_permission(PermissionState::Granted); // seen by the recheck
        let (mut manager, mut rx, _interceptor) = make_manager(gate);

        // Act
        let _ = manager.start();
        let notice = rx.recv().await;

        // Assert
        assert_eq!(notice, Some(SessionNotice::PermissionGranted));
    }

    #[tokio::test]
    async fn test_stop_cancels_pending_recheck() {
        // Arrange
        let (mut manager, mut rx, _interceptor) = make_manager(MockPermissionGate::denied());
        let _ = manager.start();

        // Act – stop before the recheck fires, then wait past the delay
        manager.stop();
        tokio::time::sleep(TEST_RECHECK_DELAY * 5).await;

        // Assert – no notice was delivered
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_permission_snapshot_reports_pending_while_recheck_outstanding() {
        // Arrange
        let (mut manager, _rx, _interceptor) = make_manager(MockPermissionGate::denied());

        // Act / Assert
        assert_eq!(manager.permission_snapshot(), PermissionState::Denied);
        let _ = manager.start();
        assert_eq!(
            manager.permission_snapshot(),
            PermissionState::PendingUserAction
        );
        tokio::time::sleep(TEST_RECHECK_DELAY * 5).await;
        assert_eq!(manager.permission_snapshot(), PermissionState::Denied);
    }
}
