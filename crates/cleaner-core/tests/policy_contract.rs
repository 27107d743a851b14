//! Contract tests for the per-event blocking policy.
//!
//! The interceptor callback's observable behavior reduces to `decide`, so
//! the full truth table is pinned here: while active, 100% of keyboard
//! events are suppressed and 100% of other events are forwarded; while
//! idle, 100% of events are forwarded.

use cleaner_core::{decide, EventDecision, InputEventKind, INTERCEPTED_KINDS};

const ALL_KINDS: [InputEventKind; 4] = [
    InputEventKind::KeyDown,
    InputEventKind::KeyUp,
    InputEventKind::ModifierChange,
    InputEventKind::Other,
];

#[test]
fn test_active_session_suppresses_all_keyboard_and_only_keyboard() {
    for kind in ALL_KINDS {
        let expected = if kind.is_keyboard() {
            EventDecision::Suppress
        } else {
            EventDecision::Forward
        };
        assert_eq!(decide(true, kind), expected, "kind: {kind:?}");
    }
}

#[test]
fn test_idle_session_never_suppresses() {
    for kind in ALL_KINDS {
        assert_eq!(decide(false, kind), EventDecision::Forward, "kind: {kind:?}");
    }
}

#[test]
fn test_registration_mask_is_exactly_the_keyboard_kinds() {
    // The tap registers for precisely the kinds the policy suppresses.
    for kind in INTERCEPTED_KINDS {
        assert!(kind.is_keyboard());
    }
    assert_eq!(INTERCEPTED_KINDS.len(), 3);
}

#[test]
fn test_decision_is_stable_across_repeated_calls() {
    // The decision is a pure function: same inputs, same output, every time.
    for _ in 0..1000 {
        assert_eq!(
            decide(true, InputEventKind::KeyDown),
            EventDecision::Suppress
        );
        assert_eq!(
            decide(false, InputEventKind::KeyDown),
            EventDecision::Forward
        );
    }
}
