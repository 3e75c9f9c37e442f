//! # Game Server - Resource Gifting Backend
//!
//! A WebSocket game server where devices log in as players, keep per-player
//! resource balances and gift resources to each other, with a live push to
//! the recipient.
//!
//! ## Architecture Overview
//!
//! ### Core Components
//!
//! * **Player Registry** ([`players::PlayerRegistry`]) - concurrent store of
//!   players keyed by identity, with at most one player per device
//! * **Resource Ledger** ([`resources::ResourceLedger`]) - per-player balances
//!   with an atomic check-and-apply
//! * **Resource Type Validator** ([`resources::ResourceTypeValidator`]) -
//!   case-insensitive allow-list predicate
//! * **Message Router** ([`messaging::MessageRouter`]) - decodes envelopes and
//!   dispatches to the Login, UpdateResources and SendGift handlers
//! * **Connection Manager** - connection limit, IDs and statistics
//!
//! ### Message Flow
//!
//! 1. Client sends a text frame `{"Type": ..., "Payload": {...}}`
//! 2. The frame is checked against the configured size and shape limits
//! 3. The router resolves the type tag and decodes the payload
//! 4. The handler validates the payload and updates one or two ledgers
//! 5. The reply is queued on the originating connection; a gift also queues
//!    a `GiftEvent` on the recipient's connection when it is online
//!
//! ## Error Handling
//!
//! * [`ServerError`] - network and startup failures
//! * [`error::HandlerError`] - structured `{"Status":"Error"}` replies
//! * [`messaging::RouterError`] - plain-text replies for unusable envelopes
//!
//! ## Thread Safety
//!
//! Every connection runs on its own task. The registry is a sharded
//! concurrent map and every ledger has its own lock, so requests touching
//! different players never contend.
//!
//! ```rust
//! # #[tokio::main]
//! # async fn main() {
//! use game_server::{create_server, ShutdownState};
//!
//! let server = create_server();
//! let shutdown = ShutdownState::new();
//! shutdown.initiate_shutdown();
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
//! server.serve(listener, shutdown).await.unwrap();
//! # }
//! ```

// Re-export core types and functions for easy access
pub use config::{SecurityConfig, ServerConfig};
pub use error::{HandlerError, ServerError};
pub use server::GameServer;
pub use shutdown::ShutdownState;
pub use utils::{create_server, create_server_with_config};

// Public module declarations
pub mod config;
pub mod connection;
pub mod error;
pub mod handlers;
pub mod messaging;
pub mod players;
pub mod resources;
pub mod security;
pub mod server;
pub mod shutdown;
pub mod utils;

// Internal modules (not part of public API)
mod tests;
