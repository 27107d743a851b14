//! SudoCleaner application entry point.
//!
//! Wires the OS adapters into the application state and starts the Tokio
//! runtime.  The windowed shell (keyboard illustration, button, toasts) is
//! created by the presentation layer, which drives the `ui_bridge` commands;
//! for the CLI/headless variant this binary simply blocks until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()            -- TOML from the platform config dir
//!  └─ AppState::new()          -- cleaning mode over the real OS adapters
//!       ├─ MacosPermissionGate -- AXIsProcessTrusted / prompt / settings
//!       └─ MacosEventTap       -- CGEventTap on the event-tap-loop thread
//! ```

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    run().await
}

#[cfg(target_os = "macos")]
async fn run() -> anyhow::Result<()> {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    use tracing::{info, warn};

    use cleaner_app::infrastructure::event_tap::macos::MacosEventTap;
    use cleaner_app::infrastructure::permissions::macos::MacosPermissionGate;
    use cleaner_app::infrastructure::storage::config::load_config;
    use cleaner_app::infrastructure::ui_bridge::AppState;

    info!("SudoCleaner starting");

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("failed to load config, using defaults: {e}");
            Default::default()
        }
    };

    let gate = Arc::new(MacosPermissionGate::new());
    let tap = Arc::new(MacosEventTap::new(config.blocking.annotated_session_first));
    let state = AppState::new(config, gate, tap);

    // Shutdown flag flipped by the Ctrl-C handler.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    info!("SudoCleaner ready.  Press Ctrl-C to exit.");

    // In the full desktop build the windowed shell is created here and
    // drives the ui_bridge commands.  The headless variant blocks until the
    // shutdown flag clears.
    loop {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if !running.load(Ordering::Relaxed) {
            break;
        }
    }

    // Make sure the keyboard is usable again before exiting.
    state.cleaning.lock().await.shutdown();

    info!("SudoCleaner stopped");
    Ok(())
}

#[cfg(not(target_os = "macos"))]
async fn run() -> anyhow::Result<()> {
    anyhow::bail!(
        "SudoCleaner blocks input through the macOS event-tap APIs; \
         this platform is not supported"
    )
}
