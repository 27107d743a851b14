//! Command bridge: exposes application-layer operations to the UI shell.
//!
//! The presentation layer (the windowed shell with the keyboard
//! illustration, button, and toast rendering) is the only consumer of this
//! module; it must NOT be imported by the application layer.
//!
//! Every command receives the shared [`AppState`] and returns a
//! [`CommandResult`], so each response has the same shape:
//! `{ success: bool, data: T | null, error: string | null }` and the shell
//! never needs a try/catch around an invocation.
//!
//! # Data Transfer Objects
//!
//! The internal types (`&'static str` tips, `PermissionState`, `Toast`) are
//! flattened into plain serializable DTOs here; any change to a DTO struct
//! must be reflected in the shell's corresponding interface.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::application::cleaning_mode::{CleaningMode, CleaningSettings};
use crate::application::toast::Toast;
use crate::infrastructure::event_tap::EventInterceptor;
use crate::infrastructure::permissions::PermissionGate;
use crate::infrastructure::storage::config::{save_config, AppConfig};

// ── Shared application state ──────────────────────────────────────────────────

/// Application state shared between UI commands.
///
/// All mutable fields are behind async `tokio::sync::Mutex`es because
/// commands run concurrently on the async runtime; an await while another
/// command holds the lock suspends the task instead of blocking the thread.
pub struct AppState {
    /// The cleaning-mode use case (session manager, tips, timer, toasts).
    pub cleaning: Mutex<CleaningMode>,
    /// The current application configuration.
    pub config: Mutex<AppConfig>,
    /// Permission gate kept for the settings deep-link command.
    gate: Arc<dyn PermissionGate>,
}

impl AppState {
    /// Wires application state onto the given OS adapters.
    pub fn new(
        config: AppConfig,
        gate: Arc<dyn PermissionGate>,
        interceptor: Arc<dyn EventInterceptor>,
    ) -> Arc<Self> {
        let settings = CleaningSettings {
            toast_duration: Duration::from_secs(config.ui.toast_duration_secs),
            tip_interval: Duration::from_secs(config.ui.tip_interval_secs),
            recheck_delay: Duration::from_millis(config.blocking.recheck_delay_ms),
        };
        let cleaning = CleaningMode::new(Arc::clone(&gate), interceptor, settings);

        Arc::new(Self {
            cleaning: Mutex::new(cleaning),
            config: Mutex::new(config),
            gate,
        })
    }
}

// ── Data Transfer Objects (Presentation layer) ────────────────────────────────

/// DTO with everything the shell needs to render one frame of state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusDto {
    pub active: bool,
    /// `"idle"` or `"active"`; redundant with `active` but keeps the shell's
    /// state switch exhaustive.
    pub phase: cleaner_core::SessionPhase,
    /// Activation message while cleaning; `null` when idle.
    pub message: Option<String>,
    /// Current pro tip while cleaning; `null` when idle.
    pub tip: Option<String>,
    pub elapsed_seconds: u64,
    /// `MM:SS` rendering of `elapsed_seconds`.
    pub elapsed_display: String,
    /// `"granted"`, `"denied"`, or `"pending_user_action"`.
    pub permission: cleaner_core::PermissionState,
}

/// DTO for the toast currently on screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastDto {
    pub title: String,
    pub description: String,
}

impl From<Toast> for ToastDto {
    fn from(t: Toast) -> Self {
        Self {
            title: t.title,
            description: t.description,
        }
    }
}

/// DTO for the user-editable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigDto {
    pub log_level: String,
    pub toast_duration_secs: u64,
    pub tip_interval_secs: u64,
    pub recheck_delay_ms: u64,
}

/// Unified response wrapper used by all commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn status_of(cleaning: &CleaningMode) -> StatusDto {
    StatusDto {
        active: cleaning.is_active(),
        phase: cleaning.phase(),
        message: cleaning.message().map(str::to_string),
        tip: cleaning.tip().map(str::to_string),
        elapsed_seconds: cleaning.elapsed_seconds(),
        elapsed_display: cleaning.elapsed_display(),
        permission: cleaning.permission(),
    }
}

/// Returns the current cleaning-mode status for rendering.
pub async fn get_status(state: Arc<AppState>) -> CommandResult<StatusDto> {
    let cleaning = state.cleaning.lock().await;
    CommandResult::ok(status_of(&cleaning))
}

/// Flips cleaning mode and returns the status afterwards.
///
/// Start failures (missing permission, install failure) are not command
/// errors: the toggle stays off, the toast carries the guidance, and the
/// returned status reflects the idle state.
pub async fn toggle_cleaning(state: Arc<AppState>) -> CommandResult<StatusDto> {
    let mut cleaning = state.cleaning.lock().await;
    cleaning.toggle();
    CommandResult::ok(status_of(&cleaning))
}

/// Returns the toast currently on screen, if any.
pub async fn current_toast(state: Arc<AppState>) -> CommandResult<Option<ToastDto>> {
    let cleaning = state.cleaning.lock().await;
    CommandResult::ok(cleaning.current_toast().map(ToastDto::from))
}

/// Opens the OS settings screen where the Accessibility permission lives.
pub async fn open_accessibility_settings(state: Arc<AppState>) -> CommandResult<()> {
    match state.gate.open_settings() {
        Ok(()) => CommandResult::ok(()),
        Err(e) => CommandResult::err(e.to_string()),
    }
}

/// Returns the user-editable configuration.
pub async fn get_config(state: Arc<AppState>) -> CommandResult<ConfigDto> {
    let cfg = state.config.lock().await;
    CommandResult::ok(ConfigDto {
        log_level: cfg.app.log_level.clone(),
        toast_duration_secs: cfg.ui.toast_duration_secs,
        tip_interval_secs: cfg.ui.tip_interval_secs,
        recheck_delay_ms: cfg.blocking.recheck_delay_ms,
    })
}

/// Applies and persists a new configuration.
///
/// Timing changes take effect on the next app launch; the running
/// cleaning-mode services keep the settings they were built with.
pub async fn update_config(state: Arc<AppState>, dto: ConfigDto) -> CommandResult<()> {
    let mut cfg = state.config.lock().await;
    cfg.app.log_level = dto.log_level;
    cfg.ui.toast_duration_secs = dto.toast_duration_secs;
    cfg.ui.tip_interval_secs = dto.tip_interval_secs;
    cfg.blocking.recheck_delay_ms = dto.recheck_delay_ms;

    if let Err(e) = save_config(&cfg) {
        return CommandResult::err(format!("failed to save config: {e}"));
    }
    CommandResult::ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
