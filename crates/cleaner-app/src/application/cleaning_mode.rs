//! CleaningMode: the user-facing toggle over the blocking session.
//!
//! Wraps [`SessionManager`] with everything the UI shows while cleaning:
//! the activation message, the rotating pro tip, the elapsed timer, and the
//! toast feedback for every outcome of a toggle.  Session notices from the
//! deferred permission recheck are pumped into toasts here.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use cleaner_core::content::{
    TOAST_ACTIVATED, TOAST_DONE, TOAST_INSTALL_FAILED, TOAST_PERMISSION_REQUIRED,
};
use cleaner_core::{format_elapsed, MessageDeck, PermissionState, SessionPhase};

use crate::infrastructure::event_tap::EventInterceptor;
use crate::infrastructure::permissions::PermissionGate;

use super::blocking_session::{SessionManager, SessionNotice, StartError};
use super::toast::ToastService;

/// Tunables for the cleaning-mode services, usually sourced from the config
/// file.
#[derive(Debug, Clone, Copy)]
pub struct CleaningSettings {
    /// How long a toast stays on screen.
    pub toast_duration: Duration,
    /// How often the pro tip rotates while cleaning.
    pub tip_interval: Duration,
    /// Delay before the single deferred permission recheck.
    pub recheck_delay: Duration,
}

impl Default for CleaningSettings {
    fn default() -> Self {
        Self {
            toast_duration: Duration::from_secs(3),
            tip_interval: Duration::from_secs(5),
            recheck_delay: Duration::from_millis(1500),
        }
    }
}

/// Rotates the pro tip on a fixed interval while cleaning is active.
struct TipCycler {
    deck: Arc<Mutex<MessageDeck>>,
    current: Arc<Mutex<Option<&'static str>>>,
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl TipCycler {
    fn new(interval: Duration) -> Self {
        Self {
            deck: Arc::new(Mutex::new(MessageDeck::cleaning_tips())),
            current: Arc::new(Mutex::new(None)),
            interval,
            task: None,
        }
    }

    fn start(&mut self) {
        self.stop();

        let first = self.deck.lock().expect("tip lock poisoned").draw();
        *self.current.lock().expect("tip lock poisoned") = Some(first);

        let deck = Arc::clone(&self.deck);
        let current = Arc::clone(&self.current);
        let interval = self.interval;
        self.task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let next = deck.lock().expect("tip lock poisoned").draw();
                *current.lock().expect("tip lock poisoned") = Some(next);
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        *self.current.lock().expect("tip lock poisoned") = None;
    }

    fn current(&self) -> Option<&'static str> {
        *self.current.lock().expect("tip lock poisoned")
    }
}

impl Drop for TipCycler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Elapsed-time tracker for the cleaning timer display.
///
/// Elapsed time is computed on read from the activation instant; the UI
/// polls status, so no ticking task is needed.
#[derive(Debug, Default)]
struct CleaningTimer {
    started: Option<Instant>,
}

impl CleaningTimer {
    fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    fn stop(&mut self) {
        self.started = None;
    }

    fn elapsed_seconds(&self) -> u64 {
        self.started.map(|t| t.elapsed().as_secs()).unwrap_or(0)
    }
}

/// The cleaning-mode use case.
pub struct CleaningMode {
    session: SessionManager,
    toasts: ToastService,
    messages: MessageDeck,
    message: Option<&'static str>,
    tips: TipCycler,
    timer: CleaningTimer,
    notice_pump: JoinHandle<()>,
}

impl CleaningMode {
    /// Wires the cleaning mode onto the given OS adapters.
    pub fn new(
        gate: Arc<dyn PermissionGate>,
        interceptor: Arc<dyn EventInterceptor>,
        settings: CleaningSettings,
    ) -> Self {
        let (session, notice_rx) =
            SessionManager::new(gate, interceptor, settings.recheck_delay);
        let toasts = ToastService::new(settings.toast_duration);
        let notice_pump = spawn_notice_pump(notice_rx, toasts.clone());

        Self {
            session,
            toasts,
            messages: MessageDeck::activation_messages(),
            message: None,
            tips: TipCycler::new(settings.tip_interval),
            timer: CleaningTimer::default(),
            notice_pump,
        }
    }

    /// Flips cleaning mode and returns whether it is active afterwards.
    ///
    /// Every outcome produces a toast; failures leave the mode off.
    pub fn toggle(&mut self) -> bool {
        if !self.session.is_active() {
            match self.session.start() {
                Ok(()) => {
                    self.message = Some(self.messages.draw());
                    self.tips.start();
                    self.timer.start();
                    self.toasts.show_copy(TOAST_ACTIVATED);
                }
                Err(StartError::PermissionRequired) => {
                    self.toasts.show_copy(TOAST_PERMISSION_REQUIRED);
                }
                Err(err @ StartError::InstallationFailed(_)) => {
                    warn!(%err, "could not activate cleaning mode");
                    self.toasts.show_copy(TOAST_INSTALL_FAILED);
                }
            }
        } else {
            self.shutdown_session();
            self.toasts.show_copy(TOAST_DONE);
        }
        self.session.is_active()
    }

    /// Stops cleaning without a toast; used on app teardown.
    pub fn shutdown(&mut self) {
        self.shutdown_session();
    }

    fn shutdown_session(&mut self) {
        self.session.stop();
        self.tips.stop();
        self.timer.stop();
        self.message = None;
    }

    /// Whether keyboard blocking is currently active.
    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    /// The session phase as a domain value.
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// The activation message for the current session, if active.
    pub fn message(&self) -> Option<&'static str> {
        self.message
    }

    /// The pro tip currently displayed, if active.
    pub fn tip(&self) -> Option<&'static str> {
        self.tips.current()
    }

    /// Seconds spent cleaning so far (0 when idle).
    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    /// `MM:SS` rendering of [`Self::elapsed_seconds`].
    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds())
    }

    /// Tri-state permission snapshot for status rendering.
    pub fn permission(&self) -> PermissionState {
        self.session.permission_snapshot()
    }

    /// The toast currently on screen, if any.
    pub fn current_toast(&self) -> Option<super::toast::Toast> {
        self.toasts.current()
    }
}

impl Drop for CleaningMode {
    fn drop(&mut self) {
        self.notice_pump.abort();
    }
}

/// Forwards recheck notices to the toast slot.
fn spawn_notice_pump(
    mut rx: mpsc::UnboundedReceiver<SessionNotice>,
    toasts: ToastService,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(notice) = rx.recv().await {
            match notice {
                SessionNotice::PermissionStillMissing => {
                    toasts.show_copy(TOAST_PERMISSION_REQUIRED);
                }
                SessionNotice::PermissionGranted => {
                    info!("accessibility permission granted; ready to clean");
                }
            }
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_tap::mock::MockInterceptor;
    use crate::infrastructure::permissions::mock::MockPermissionGate;
    use cleaner_core::{EventDecision, InputEventKind, CLEANING_TIPS};

    fn test_settings() -> CleaningSettings {
        CleaningSettings {
            toast_duration: Duration::from_millis(40),
            tip_interval: Duration::from_millis(20),
            recheck_delay: Duration::from_millis(10),
        }
    }

    fn make_mode(gate: MockPermissionGate) -> (CleaningMode, MockInterceptor) {
        let interceptor = MockInterceptor::new();
        let mode = CleaningMode::new(
            Arc::new(gate),
            Arc::new(interceptor.clone()),
            test_settings(),
        );
        (mode, interceptor)
    }

    #[tokio::test]
    async fn test_toggle_on_activates_and_populates_content() {
        // Arrange
        let (mut mode, interceptor) = make_mode(MockPermissionGate::granted());

        // Act
        let active = mode.toggle();

        // Assert
        assert!(active);
        assert!(mode.message().is_some());
        assert_eq!(mode.tip(), Some(CLEANING_TIPS[0]));
        assert_eq!(
            mode.current_toast().expect("activation toast").title,
            TOAST_ACTIVATED.0
        );
        assert_eq!(
            interceptor.feed(InputEventKind::KeyDown),
            EventDecision::Suppress
        );
    }

    #[tokio::test]
    async fn test_toggle_off_clears_content_and_restores_input() {
        // Arrange
        let (mut mode, interceptor) = make_mode(MockPermissionGate::granted());
        mode.toggle();

        // Act
        let active = mode.toggle();

        // Assert
        assert!(!active);
        assert!(mode.message().is_none());
        assert!(mode.tip().is_none());
        assert_eq!(mode.elapsed_seconds(), 0);
        assert_eq!(
            mode.current_toast().expect("done toast").title,
            TOAST_DONE.0
        );
        assert_eq!(
            interceptor.feed(InputEventKind::KeyDown),
            EventDecision::Forward
        );
    }

    #[tokio::test]
    async fn test_toggle_with_denied_permission_shows_guidance_toast() {
        // Arrange
        let (mut mode, interceptor) = make_mode(MockPermissionGate::denied());

        // Act
        let active = mode.toggle();

        // Assert
        assert!(!active);
        assert_eq!(
            mode.current_toast().expect("permission toast").title,
            TOAST_PERMISSION_REQUIRED.0
        );
        assert_eq!(interceptor.install_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_with_install_failure_shows_warning_toast() {
        // Arrange
        let (mut mode, interceptor) = make_mode(MockPermissionGate::granted());
        interceptor.fail_next_install();

        // Act
        let active = mode.toggle();

        // Assert
        assert!(!active);
        assert_eq!(
            mode.current_toast().expect("warning toast").title,
            TOAST_INSTALL_FAILED.0
        );
    }

    #[tokio::test]
    async fn test_tip_rotates_while_active() {
        // Arrange
        let (mut mode, _interceptor) = make_mode(MockPermissionGate::granted());
        mode.toggle();
        let first = mode.tip().expect("initial tip");

        // Act – wait past two rotation intervals
        tokio::time::sleep(Duration::from_millis(50)).await;
        let later = mode.tip().expect("rotated tip");

        // Assert
        assert_ne!(first, later, "tip must advance while cleaning");
    }

    #[tokio::test]
    async fn test_recheck_notice_becomes_a_toast() {
        // Arrange
        let (mut mode, _interceptor) = make_mode(MockPermissionGate::denied());
        mode.toggle();

        // Act – wait for the deferred recheck to fire and the pump to run
        tokio::time::sleep(Duration::from_millis(30)).await;

        // Assert – the guidance toast is (still) showing
        assert_eq!(
            mode.current_toast().expect("guidance toast").title,
            TOAST_PERMISSION_REQUIRED.0
        );
    }

    #[tokio::test]
    async fn test_elapsed_display_formats_zero_when_idle() {
        let (mode, _interceptor) = make_mode(MockPermissionGate::granted());
        assert_eq!(mode.elapsed_display(), "00:00");
    }
}
