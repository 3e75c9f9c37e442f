//! Server configuration types and defaults.
//!
//! This module contains the server configuration structure and default values
//! used to initialize and customize the game server behavior.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Default listen address of the server.
pub const DEFAULT_BIND_ADDRESS: SocketAddr = SocketAddr::V4(std::net::SocketAddrV4::new(
    std::net::Ipv4Addr::LOCALHOST,
    5000,
));

/// Configuration structure for the game server.
///
/// Contains all necessary parameters to configure server behavior including
/// network settings, the resource allow-list, session lifecycle and
/// inbound frame limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The socket address to bind the server to
    pub bind_address: SocketAddr,

    /// Maximum number of concurrent connections allowed
    pub max_connections: usize,

    /// Accepted resource type names, matched case-insensitively
    pub valid_resource_types: Vec<String>,

    /// Remove players when their connection closes instead of only
    /// detaching the connection
    pub evict_on_disconnect: bool,

    /// Security configuration settings
    pub security: SecurityConfig,
}

/// Limits applied to every inbound text frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum message size in bytes
    pub max_message_size: usize,

    /// Maximum allowed nesting depth for JSON messages
    pub max_json_depth: usize,

    /// Maximum allowed string length in JSON
    pub max_string_length: usize,

    /// Maximum allowed array/object size
    pub max_collection_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS,
            max_connections: 1000,
            valid_resource_types: vec!["coins".to_string(), "rolls".to_string()],
            evict_on_disconnect: false,
            security: SecurityConfig::default(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_message_size: 64 * 1024, // 64KB
            max_json_depth: 10,
            max_string_length: 1024,
            max_collection_size: 100,
        }
    }
}
