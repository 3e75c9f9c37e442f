//! Signal handling for graceful server shutdown.
//!
//! This module provides cross-platform signal handling to allow the server
//! to shut down gracefully when receiving termination signals. The first
//! signal initiates shutdown on a [`ShutdownState`] shared with the game
//! server; the application treats a second one as a request to exit at once.

use game_server::ShutdownState;
use tokio::signal;
use tracing::info;

/// Waits for a termination signal and initiates shutdown on `shutdown_state`.
///
/// # Platform Support
///
/// * **Unix platforms**: Handles SIGINT and SIGTERM signals
/// * **Windows**: Handles Ctrl+C signal
///
/// # Returns
///
/// `Ok(())` once a signal was received and shutdown was initiated, or an
/// error if signal handling setup failed.
///
/// # Example
///
/// ```rust,no_run
/// use game_server::ShutdownState;
/// use lib_gift_server::signals::setup_signal_handlers;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let shutdown_state = ShutdownState::new();
///     // Start your server with a clone of `shutdown_state`...
///
///     setup_signal_handlers(&shutdown_state).await?;
///     assert!(shutdown_state.is_shutdown_initiated());
///     Ok(())
/// }
/// ```
pub async fn setup_signal_handlers(shutdown_state: &ShutdownState) -> Result<(), Box<dyn std::error::Error>> {
    wait_for_signal().await?;
    info!("📡 Received shutdown signal - initiating graceful shutdown");
    shutdown_state.initiate_shutdown();
    Ok(())
}

/// Returns when SIGINT or SIGTERM (Ctrl+C on Windows) arrives.
pub async fn wait_for_signal() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => (),
            _ = sigterm.recv() => ()
        }
    }

    #[cfg(windows)]
    signal::ctrl_c().await?;

    Ok(())
}
