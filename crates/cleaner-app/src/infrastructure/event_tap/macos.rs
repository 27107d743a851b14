//! macOS CGEventTap implementation of the keyboard interceptor.
//!
//! # What is a CGEventTap? (for beginners)
//!
//! macOS lets a trusted process insert itself into the system input stream:
//! `CGEventTapCreate` registers a callback that receives every qualifying
//! event *before* any application does, and the callback decides per event
//! whether to hand it on or swallow it (return `None`).  Creating a
//! session-level tap with default (blocking) options requires the
//! Accessibility permission; without it the create call fails.
//!
//! The tap is bound to a CFRunLoop.  This module runs that loop on a
//! dedicated `event-tap-loop` thread, mirroring the dedicated hook thread a
//! Windows low-level hook needs: the thread creates the tap, attaches the
//! run-loop source, enables the tap, and then pumps the loop in bounded
//! slices until shutdown is signalled.  Install success or failure is
//! reported back to the caller synchronously over a channel before
//! `install` returns.
//!
//! # Tap location fallback
//!
//! The annotated-session tap location captures a superset of events
//! (including system function keys on some configurations), so it is tried
//! first; if the OS refuses it, the plain session location is used instead.
//!
//! # Callback budget
//!
//! The OS disables a tap whose callback stalls.  The callback here performs
//! one atomic load plus the branch-only policy decision, nothing else.

#![cfg(target_os = "macos")]

use std::ffi::c_void;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use core_foundation::base::TCFType;
use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType,
};
use tracing::{debug, info, warn};

use cleaner_core::{decide, EventDecision, InputEventKind};

use super::{EventInterceptor, InstallError, InterceptorHandle};

// CGEventTapEnable / CGEventTapIsEnabled are not surfaced by the
// core-graphics crate; the framework itself is already linked by it.
#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapEnable(tap: *mut c_void, enable: bool);
    fn CGEventTapIsEnabled(tap: *mut c_void) -> bool;
}

/// How long each run-loop slice lasts before the shutdown flag is re-checked.
/// Bounds the latency of `shutdown()` joining the tap thread.
const RUNLOOP_SLICE: Duration = Duration::from_millis(250);

/// How long `install` waits for the tap thread to report readiness.
const INSTALL_TIMEOUT: Duration = Duration::from_secs(2);

/// macOS event-tap interceptor backend.
pub struct MacosEventTap {
    annotated_session_first: bool,
}

impl MacosEventTap {
    /// Creates a new (uninstalled) backend.
    ///
    /// `annotated_session_first` controls the tap-location fallback chain;
    /// see the module docs.
    pub fn new(annotated_session_first: bool) -> Self {
        Self {
            annotated_session_first,
        }
    }

    fn locations(&self) -> Vec<CGEventTapLocation> {
        if self.annotated_session_first {
            vec![
                CGEventTapLocation::AnnotatedSession,
                CGEventTapLocation::Session,
            ]
        } else {
            vec![CGEventTapLocation::Session]
        }
    }
}

impl Default for MacosEventTap {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EventInterceptor for MacosEventTap {
    fn install(
        &self,
        active: Arc<AtomicBool>,
    ) -> Result<Box<dyn InterceptorHandle>, InstallError> {
        let stop = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), InstallError>>();

        let locations = self.locations();
        let thread_stop = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("event-tap-loop".to_string())
            .spawn(move || run_tap_loop(active, thread_stop, locations, ready_tx))
            .map_err(|e| InstallError::TapCreationFailed(e.to_string()))?;

        match ready_rx.recv_timeout(INSTALL_TIMEOUT) {
            Ok(Ok(())) => Ok(Box::new(MacosTapHandle {
                stop,
                thread: Some(thread),
            })),
            Ok(Err(e)) => {
                // The loop thread exits on its own after reporting failure.
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                stop.store(true, Ordering::SeqCst);
                let _ = thread.join();
                Err(InstallError::TapThreadDied)
            }
        }
    }
}

/// Handle to a live macOS tap: the loop thread plus its shutdown flag.
struct MacosTapHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl InterceptorHandle for MacosTapHandle {
    fn shutdown(mut self: Box<Self>) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            // Each run-loop slice is bounded, so the join completes promptly.
            // The thread disables the tap before releasing the mach port.
            let _ = thread.join();
        }
    }
}

impl Drop for MacosTapHandle {
    fn drop(&mut self) {
        // shutdown() already joined; a bare drop still signals the thread so
        // the tap cannot outlive its handle.
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Entry point for the dedicated event-tap thread.
fn run_tap_loop(
    active: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    locations: Vec<CGEventTapLocation>,
    ready_tx: mpsc::Sender<Result<(), InstallError>>,
) {
    let mut tap = None;
    for location in locations {
        let flag = Arc::clone(&active);
        match CGEventTap::new(
            location,
            CGEventTapPlacement::HeadInsertEventTap,
            CGEventTapOptions::Default,
            vec![
                CGEventType::KeyDown,
                CGEventType::KeyUp,
                CGEventType::FlagsChanged,
            ],
            move |_proxy, event_type, event: &CGEvent| -> Option<CGEvent> {
                let kind = classify(event_type);
                match decide(flag.load(Ordering::Acquire), kind) {
                    EventDecision::Suppress => None,
                    EventDecision::Forward => Some(event.clone()),
                }
            },
        ) {
            Ok(created) => {
                debug!(?location, "event tap created");
                tap = Some(created);
                break;
            }
            Err(()) => {
                warn!(?location, "event tap rejected at this location");
            }
        }
    }

    let Some(tap) = tap else {
        let _ = ready_tx.send(Err(InstallError::TapCreationFailed(
            "every tap location was rejected; Accessibility permission may be missing".to_string(),
        )));
        return;
    };

    let source = match tap.mach_port.create_runloop_source(0) {
        Ok(source) => source,
        Err(()) => {
            let _ = ready_tx.send(Err(InstallError::TapCreationFailed(
                "failed to create the run-loop source".to_string(),
            )));
            return;
        }
    };

    let run_loop = CFRunLoop::get_current();
    unsafe {
        run_loop.add_source(&source, kCFRunLoopDefaultMode);
    }

    tap.enable();

    // The OS occasionally leaves a fresh tap disabled; retry once before
    // reporting the installation as failed.
    if !tap_is_enabled(&tap) {
        warn!("event tap did not come up enabled; retrying once");
        tap.enable();
        if !tap_is_enabled(&tap) {
            unsafe {
                run_loop.remove_source(&source, kCFRunLoopDefaultMode);
            }
            let _ = ready_tx.send(Err(InstallError::TapNotEnabled));
            return;
        }
    }

    let _ = ready_tx.send(Ok(()));
    info!("event tap enabled; keyboard events are now interceptable");

    while !stop.load(Ordering::SeqCst) {
        CFRunLoop::run_in_mode(unsafe { kCFRunLoopDefaultMode }, RUNLOOP_SLICE, false);
    }

    // Disable delivery first, then detach and release the port.
    set_tap_enabled(&tap, false);
    unsafe {
        run_loop.remove_source(&source, kCFRunLoopDefaultMode);
    }
    debug!("event tap disabled and released");
}

/// Maps the raw CoreGraphics event type onto the policy's classification.
///
/// The tap registers only for the three keyboard types, but the OS also
/// delivers pseudo-events (tap-disabled notifications) through the same
/// callback; those fall through to `Other` and are forwarded.
fn classify(event_type: CGEventType) -> InputEventKind {
    match event_type {
        CGEventType::KeyDown => InputEventKind::KeyDown,
        CGEventType::KeyUp => InputEventKind::KeyUp,
        CGEventType::FlagsChanged => InputEventKind::ModifierChange,
        _ => InputEventKind::Other,
    }
}

fn tap_is_enabled(tap: &CGEventTap<'_>) -> bool {
    unsafe { CGEventTapIsEnabled(tap.mach_port.as_concrete_TypeRef() as *mut c_void) }
}

fn set_tap_enabled(tap: &CGEventTap<'_>, enable: bool) {
    unsafe { CGEventTapEnable(tap.mach_port.as_concrete_TypeRef() as *mut c_void, enable) }
}
