//! Application layer use cases for SudoCleaner.
//!
//! Use cases in this layer orchestrate the domain logic from `cleaner_core`
//! and depend on the infrastructure only through traits, so every OS-facing
//! piece can be swapped for a mock in tests.
//!
//! # Sub-modules
//!
//! - **`blocking_session`** – Owns the lifecycle of the system-wide keyboard
//!   interceptor: permission gating, install/teardown, and the deferred
//!   permission recheck.  This is the core of the application — everything
//!   else is decoration around its two-state toggle.
//!
//! - **`cleaning_mode`** – The user-facing toggle: starts/stops the blocking
//!   session and drives the activation message, rotating tips, and elapsed
//!   timer the UI renders while cleaning.
//!
//! - **`toast`** – Current-toast state with scheduled auto-dismiss.

pub mod blocking_session;
pub mod cleaning_mode;
pub mod toast;
