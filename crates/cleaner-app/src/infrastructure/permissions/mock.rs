//! Scriptable permission gate for tests.
//!
//! Tests set the trust status (or queue a sequence of per-query answers, to
//! simulate a grant happening between the start attempt and the deferred
//! recheck) and observe how often the prompt and the settings opener were
//! invoked.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use cleaner_core::PermissionState;

use super::{PermissionError, PermissionGate};

/// A mock implementation of [`PermissionGate`] for tests.
pub struct MockPermissionGate {
    /// Per-query scripted answers, consumed front to back.
    script: Mutex<VecDeque<PermissionState>>,
    /// Answer returned once the script is exhausted.
    fallback: Mutex<PermissionState>,
    requests: AtomicUsize,
    settings_opens: AtomicUsize,
}

impl Default for MockPermissionGate {
    fn default() -> Self {
        Self::denied()
    }
}

impl MockPermissionGate {
    /// Gate that always answers `Granted`.
    pub fn granted() -> Self {
        Self::with_fallback(PermissionState::Granted)
    }

    /// Gate that always answers `Denied`.
    pub fn denied() -> Self {
        Self::with_fallback(PermissionState::Denied)
    }

    fn with_fallback(state: PermissionState) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(state),
            requests: AtomicUsize::new(0),
            settings_opens: AtomicUsize::new(0),
        }
    }

    /// Changes the fallback answer, e.g. to simulate an out-of-band grant.
    pub fn set_permission(&self, state: PermissionState) {
        *self.fallback.lock().expect("mock gate lock poisoned") = state;
    }

    /// Queues an answer for the next `query()` call ahead of the fallback.
    pub fn push_response(&self, state: PermissionState) {
        self.script
            .lock()
            .expect("mock gate lock poisoned")
            .push_back(state);
    }

    /// Number of times the OS prompt was requested.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Number of times the settings opener was invoked.
    pub fn settings_open_count(&self) -> usize {
        self.settings_opens.load(Ordering::SeqCst)
    }
}

impl PermissionGate for MockPermissionGate {
    fn query(&self) -> PermissionState {
        if let Some(scripted) = self
            .script
            .lock()
            .expect("mock gate lock poisoned")
            .pop_front()
        {
            return scripted;
        }
        *self.fallback.lock().expect("mock gate lock poisoned")
    }

    fn request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn open_settings(&self) -> Result<(), PermissionError> {
        self.settings_opens.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_responses_take_priority_over_fallback() {
        // Arrange
        let gate = MockPermissionGate::denied();
        gate.push_response(PermissionState::Granted);

        // Act / Assert – scripted first, then fallback
        assert_eq!(gate.query(), PermissionState::Granted);
        assert_eq!(gate.query(), PermissionState::Denied);
    }

    #[test]
    fn test_request_and_settings_counters() {
        let gate = MockPermissionGate::denied();
        gate.request();
        gate.request();
        gate.open_settings().expect("mock never fails");
        assert_eq!(gate.request_count(), 2);
        assert_eq!(gate.settings_open_count(), 1);
    }
}
