//! # cleaner-core
//!
//! Shared domain library for SudoCleaner containing the input-blocking
//! policy, session state types, and the cleaning-mode content decks.
//!
//! This crate is used by the desktop application crate (`cleaner-app`).
//! It has zero dependencies on OS APIs, UI frameworks, or async runtimes.
//!
//! # Architecture overview (for beginners)
//!
//! SudoCleaner disables the keyboard system-wide so a laptop keyboard can be
//! physically cleaned without typing garbage into whatever window happens to
//! have focus.  The OS-facing machinery (the macOS event tap, the
//! Accessibility permission prompt) lives in `cleaner-app`; this crate
//! defines the pure logic those adapters delegate to:
//!
//! - **`policy`** – The per-event suppress/forward decision.  The OS invokes
//!   the event-tap callback for every qualifying input event; the callback
//!   must answer "suppress or forward?" synchronously and without blocking,
//!   so the decision is a pure function of the session's active flag and the
//!   event kind.
//!
//! - **`domain`** – The session state machine vocabulary (`Idle`/`Active`)
//!   and the tri-state Accessibility permission snapshot.
//!
//! - **`content`** – The activation messages, cleaning tips, and toast copy
//!   shown while cleaning, plus the elapsed-time formatter.

// Declare the top-level modules.  Rust will look for each in a
// subdirectory or file with the same name (e.g., src/policy/mod.rs).
pub mod content;
pub mod domain;
pub mod policy;

// Re-export the most-used types at the crate root so callers can write
// `cleaner_core::EventDecision` instead of `cleaner_core::policy::EventDecision`.
pub use content::{format_elapsed, MessageDeck, ACTIVATION_MESSAGES, CLEANING_TIPS};
pub use domain::session::{PermissionState, SessionPhase};
pub use policy::{decide, EventDecision, InputEventKind, INTERCEPTED_KINDS};
