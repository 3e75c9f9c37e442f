//! Client connection representation.
//!
//! This module defines the bookkeeping record kept for every open client
//! connection.

use std::net::SocketAddr;
use std::time::{Duration, SystemTime};

/// Represents an individual client connection to the server.
///
/// # Fields
///
/// * `remote_addr` - The network address of the connected client
/// * `connected_at` - Timestamp when the connection was established
/// * `frames_handled` - Number of text frames dispatched so far
#[derive(Debug)]
pub struct ClientConnection {
    /// The remote network address of the client
    pub remote_addr: SocketAddr,

    /// When this connection was established
    pub connected_at: SystemTime,

    /// Text frames dispatched on this connection
    pub frames_handled: u64,
}

impl ClientConnection {
    /// Creates a new client connection record for the specified remote address,
    /// recording the current time as the connection timestamp.
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            remote_addr,
            connected_at: SystemTime::now(),
            frames_handled: 0,
        }
    }

    /// How long this connection has been open.
    pub fn uptime(&self) -> Duration {
        self.connected_at.elapsed().unwrap_or_default()
    }
}
