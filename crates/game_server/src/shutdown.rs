//! Shutdown coordination for graceful server shutdown.
//!
//! This module provides shared shutdown state for coordinating graceful
//! shutdown across the accept loop and every connection task, so that
//! in-flight requests finish before the process exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

/// Shared shutdown state for coordinating graceful shutdown across components.
#[derive(Debug, Clone)]
pub struct ShutdownState {
    /// Flag indicating shutdown has been initiated - no new connections or frames should be accepted
    shutdown_initiated: Arc<AtomicBool>,
    /// Flag indicating the server has drained and final cleanup can begin
    shutdown_complete: Arc<AtomicBool>,
    /// Wakes tasks parked in [`ShutdownState::wait`]
    notify: Arc<Notify>,
}

impl ShutdownState {
    /// Creates a new shutdown state with both flags set to false.
    pub fn new() -> Self {
        Self {
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
            shutdown_complete: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Returns true if shutdown has been initiated.
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shutdown_initiated.load(Ordering::Acquire)
    }

    /// Returns true if shutdown is complete and final cleanup can begin.
    pub fn is_shutdown_complete(&self) -> bool {
        self.shutdown_complete.load(Ordering::Acquire)
    }

    /// Initiates shutdown and wakes every waiting task.
    pub fn initiate_shutdown(&self) {
        if !self.shutdown_initiated.swap(true, Ordering::AcqRel) {
            info!("🛑 Shutdown initiated - no new connections will be accepted");
        }
        self.notify.notify_waiters();
    }

    /// Marks shutdown as complete - the accept loop has stopped.
    pub fn complete_shutdown(&self) {
        self.shutdown_complete.store(true, Ordering::Release);
        info!("✅ Server drained - ready for final cleanup");
    }

    /// Resolves once shutdown has been initiated.
    pub async fn wait(&self) {
        loop {
            // Register before checking the flag so a concurrent initiate is not missed.
            let notified = self.notify.notified();
            if self.is_shutdown_initiated() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_resolves_after_initiate() {
        let state = ShutdownState::new();
        let waiter = {
            let state = state.clone();
            tokio::spawn(async move { state.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        state.initiate_shutdown();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woke")
            .expect("waiter did not panic");
        assert!(state.is_shutdown_initiated());
        assert!(!state.is_shutdown_complete());
    }

    #[tokio::test]
    async fn test_wait_after_initiate_returns_immediately() {
        let state = ShutdownState::new();
        state.initiate_shutdown();
        state.initiate_shutdown();
        tokio::time::timeout(Duration::from_millis(100), state.wait())
            .await
            .expect("already initiated");

        state.complete_shutdown();
        assert!(state.is_shutdown_complete());
    }
}
