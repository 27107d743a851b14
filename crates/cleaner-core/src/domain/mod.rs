//! Domain entities for the blocking session.
//!
//! Pure state vocabulary with no OS dependencies; the session *behavior*
//! (permission gating, interceptor lifecycle) lives in the application layer
//! of `cleaner-app`.

pub mod session;
