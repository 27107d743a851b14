//! Mock interceptor for unit and integration testing.
//!
//! Lets tests exercise the full session lifecycle without OS hooks or the
//! Accessibility permission: installs are counted, live handles are tracked
//! (at most one may ever be live), install failures can be injected, and
//! [`MockInterceptor::feed`] drives a synthetic event through the same
//! policy decision the real tap callback makes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cleaner_core::{decide, EventDecision, InputEventKind};

use super::{EventInterceptor, InstallError, InterceptorHandle};

/// A mock implementation of [`EventInterceptor`] for tests.
#[derive(Clone, Default)]
pub struct MockInterceptor {
    state: Arc<MockState>,
}

#[derive(Default)]
struct MockState {
    installs: AtomicUsize,
    live_handles: AtomicUsize,
    fail_next_install: AtomicBool,
    /// Active flag of the most recent install; `None` until installed.
    flag: Mutex<Option<Arc<AtomicBool>>>,
}

impl MockInterceptor {
    /// Creates a new mock interceptor with no installs recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `install` call fail with `TapCreationFailed`.
    pub fn fail_next_install(&self) {
        self.state.fail_next_install.store(true, Ordering::SeqCst);
    }

    /// Total number of successful installs so far.
    pub fn install_count(&self) -> usize {
        self.state.installs.load(Ordering::SeqCst)
    }

    /// Number of handles currently live (installed and not shut down).
    pub fn live_handles(&self) -> usize {
        self.state.live_handles.load(Ordering::SeqCst)
    }

    /// Delivers a synthetic event as the OS would and returns the decision
    /// the callback made.
    ///
    /// With no install live, events flow untouched, so the result is
    /// [`EventDecision::Forward`].
    pub fn feed(&self, kind: InputEventKind) -> EventDecision {
        let guard = self.state.flag.lock().expect("mock flag lock poisoned");
        match guard.as_ref() {
            Some(flag) => decide(flag.load(Ordering::Acquire), kind),
            None => EventDecision::Forward,
        }
    }
}

impl EventInterceptor for MockInterceptor {
    fn install(
        &self,
        active: Arc<AtomicBool>,
    ) -> Result<Box<dyn InterceptorHandle>, InstallError> {
        if self.state.fail_next_install.swap(false, Ordering::SeqCst) {
            return Err(InstallError::TapCreationFailed(
                "injected install failure".to_string(),
            ));
        }

        *self.state.flag.lock().expect("mock flag lock poisoned") = Some(active);
        self.state.installs.fetch_add(1, Ordering::SeqCst);
        self.state.live_handles.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MockHandle {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockHandle {
    state: Arc<MockState>,
}

impl InterceptorHandle for MockHandle {
    fn shutdown(self: Box<Self>) {
        // Dropping releases; see the Drop impl.
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.state.live_handles.fetch_sub(1, Ordering::SeqCst);
    }
}
