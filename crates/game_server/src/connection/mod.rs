//! Connection management for client connections.
//!
//! This module handles the lifecycle of client connections: connection
//! accounting, the outbound queue handles used for replies and pushes, and
//! the weak references players keep to their connection.

pub mod client;
pub mod handle;
pub mod manager;

pub use handle::{ConnectionClosed, ConnectionHandle, WeakConnectionHandle};
pub use manager::ConnectionManager;

/// Type alias for connection identifiers.
///
/// Connection IDs are used to uniquely identify client connections
/// throughout their lifecycle on the server.
pub type ConnectionId = usize;
