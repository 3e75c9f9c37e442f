//! Connection manager for tracking client connections.
//!
//! This module provides the central accounting for all client connections:
//! ID assignment, the connection limit, and per-connection statistics.

use super::{client::ClientConnection, ConnectionId};
use crate::error::ServerError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Central manager for all client connections.
///
/// The `ConnectionManager` tracks active connections, assigns unique IDs and
/// enforces the configured connection limit. It uses async-safe data
/// structures to handle concurrent access from multiple connection tasks.
#[derive(Debug)]
pub struct ConnectionManager {
    /// Map of connection ID to client connection information
    connections: Arc<RwLock<HashMap<ConnectionId, ClientConnection>>>,

    /// Atomic counter for generating unique connection IDs
    next_id: AtomicUsize,

    /// Maximum number of simultaneously open connections
    max_connections: usize,
}

impl ConnectionManager {
    /// Creates a new connection manager admitting at most `max_connections`.
    pub fn new(max_connections: usize) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicUsize::new(1),
            max_connections,
        }
    }

    /// Adds a new connection and returns its unique ID.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Internal` when the connection limit is reached.
    pub async fn add_connection(&self, remote_addr: SocketAddr) -> Result<ConnectionId, ServerError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.max_connections {
            return Err(ServerError::Internal(format!(
                "Connection limit of {} reached, rejecting {}",
                self.max_connections, remote_addr
            )));
        }

        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        connections.insert(connection_id, ClientConnection::new(remote_addr));
        info!("🔗 Connection {} from {}", connection_id, remote_addr);
        Ok(connection_id)
    }

    /// Removes a connection from the manager.
    ///
    /// Cleans up the connection entry and logs the disconnection.
    pub async fn remove_connection(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.remove(&connection_id) {
            info!(
                "❌ Connection {} from {} disconnected after {:.1}s ({} frames)",
                connection_id,
                connection.remote_addr,
                connection.uptime().as_secs_f64(),
                connection.frames_handled
            );
        }
    }

    /// Counts one dispatched frame against a connection.
    pub async fn record_frame(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if let Some(connection) = connections.get_mut(&connection_id) {
            connection.frames_handled += 1;
        }
    }

    /// Number of currently open connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Remote address of an open connection.
    pub async fn remote_addr(&self, connection_id: ConnectionId) -> Option<SocketAddr> {
        let connections = self.connections.read().await;
        connections.get(&connection_id).map(|c| c.remote_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_removal_frees_slot() {
        let manager = ConnectionManager::new(2);
        let first = manager.add_connection(addr(1000)).await.expect("slot free");
        let second = manager.add_connection(addr(1001)).await.expect("slot free");
        assert_ne!(first, second);
        assert_eq!(manager.connection_count().await, 2);

        assert!(manager.add_connection(addr(1002)).await.is_err());

        manager.remove_connection(first).await;
        assert_eq!(manager.connection_count().await, 1);
        assert!(manager.add_connection(addr(1003)).await.is_ok());
    }

    #[tokio::test]
    async fn test_record_frame_and_lookup() {
        let manager = ConnectionManager::new(10);
        let id = manager.add_connection(addr(2000)).await.expect("slot free");
        manager.record_frame(id).await;
        assert_eq!(manager.remote_addr(id).await, Some(addr(2000)));
        assert_eq!(manager.remote_addr(id + 100).await, None);
    }
}
