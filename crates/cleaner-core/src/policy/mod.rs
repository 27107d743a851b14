//! Per-event suppress/forward policy.
//!
//! The OS event tap invokes its callback once per qualifying input event and
//! expects a synchronous answer: hand the event to the rest of the system,
//! or swallow it.  The callback runs on the tap's dispatch path, so the
//! decision here is a pure function — no locks, no I/O, no allocation.
//! Everything the decision needs is the session's active flag (read by the
//! caller with at least acquire ordering) and the event kind.
//!
//! Policy:
//!
//! - While active, every keyboard-origin event is suppressed — key-down,
//!   key-up, and modifier changes alike, with no exceptions for media or
//!   system keys (those arrive as ordinary key events).
//! - Pointer and other non-keyboard events are always forwarded.
//! - While idle, everything is forwarded.  The callback must never suppress
//!   when the session is not active, even if the tap is still draining.

/// Classification of a raw input event as seen by the interceptor callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEventKind {
    /// A key was pressed down.
    KeyDown,
    /// A key was released.
    KeyUp,
    /// A modifier key changed state (shift, control, option, command, fn).
    ModifierChange,
    /// Anything that is not keyboard input: pointer motion, clicks, scroll,
    /// and OS pseudo-events such as tap-disabled notifications.
    Other,
}

impl InputEventKind {
    /// Returns `true` if this kind originates from the keyboard.
    pub fn is_keyboard(self) -> bool {
        matches!(
            self,
            InputEventKind::KeyDown | InputEventKind::KeyUp | InputEventKind::ModifierChange
        )
    }
}

/// The event kinds the interceptor registers for.
///
/// Non-keyboard events never reach the tap at all, but the callback still
/// treats unknown kinds defensively (see [`decide`]): the OS delivers
/// pseudo-events (e.g. tap-disabled-by-timeout) through the same callback
/// regardless of the registration mask.
pub const INTERCEPTED_KINDS: [InputEventKind; 3] = [
    InputEventKind::KeyDown,
    InputEventKind::KeyUp,
    InputEventKind::ModifierChange,
];

/// Outcome of the per-event decision.  Exactly one applies per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDecision {
    /// Hand the event to the rest of the system unchanged.
    Forward,
    /// Drop the event; no application or the OS itself will see it.
    Suppress,
}

/// Decides whether a single event is suppressed or forwarded.
///
/// Pure and allocation-free; safe to call from the OS callback within its
/// per-event time budget.
pub fn decide(active: bool, kind: InputEventKind) -> EventDecision {
    if active && kind.is_keyboard() {
        EventDecision::Suppress
    } else {
        EventDecision::Forward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_suppresses_every_keyboard_kind() {
        for kind in INTERCEPTED_KINDS {
            assert_eq!(decide(true, kind), EventDecision::Suppress);
        }
    }

    #[test]
    fn test_active_forwards_non_keyboard_events() {
        assert_eq!(decide(true, InputEventKind::Other), EventDecision::Forward);
    }

    #[test]
    fn test_idle_forwards_everything() {
        for kind in [
            InputEventKind::KeyDown,
            InputEventKind::KeyUp,
            InputEventKind::ModifierChange,
            InputEventKind::Other,
        ] {
            assert_eq!(decide(false, kind), EventDecision::Forward);
        }
    }

    #[test]
    fn test_is_keyboard_classification() {
        assert!(InputEventKind::KeyDown.is_keyboard());
        assert!(InputEventKind::KeyUp.is_keyboard());
        assert!(InputEventKind::ModifierChange.is_keyboard());
        assert!(!InputEventKind::Other.is_keyboard());
    }
}
