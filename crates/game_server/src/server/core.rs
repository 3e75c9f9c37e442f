//! Core game server implementation.
//!
//! This module contains the main `GameServer` struct and its implementation,
//! wiring the player registry, the message router and connection accounting
//! together behind a WebSocket accept loop.

use crate::{
    config::ServerConfig,
    connection::ConnectionManager,
    error::ServerError,
    handlers::HandlerContext,
    messaging::MessageRouter,
    players::PlayerRegistry,
    resources::{ResourceTypeList, ResourceTypeValidator},
    server::handlers::handle_connection,
    shutdown::ShutdownState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// How long open connections get to finish after shutdown is initiated.
const CONNECTION_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// State shared by the accept loop and every connection task.
#[derive(Debug)]
pub(crate) struct ServerContext {
    pub config: ServerConfig,
    pub registry: Arc<PlayerRegistry>,
    pub router: MessageRouter,
    pub connection_manager: ConnectionManager,
}

/// The core game server structure.
///
/// `GameServer` owns the process-wide player registry and the immutable
/// message router, accepts WebSocket connections and runs one task per
/// connection.
///
/// # Architecture
///
/// * **Player Registry**: concurrent store of every logged-in player and its ledger
/// * **Message Router**: fixed table of Login, UpdateResources and SendGift handlers
/// * **Connection Management**: connection limit, IDs and per-connection statistics
/// * **Shutdown**: a shared [`ShutdownState`] stops the accept loop and closes connections
pub struct GameServer {
    /// State shared with connection tasks
    context: Arc<ServerContext>,

    /// Internal shutdown trigger used by [`GameServer::shutdown`]
    shutdown_state: ShutdownState,
}

impl GameServer {
    /// Creates a new game server with the specified configuration.
    ///
    /// The resource type allow-list is built from
    /// `config.valid_resource_types`.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration parameters for server behavior
    ///
    /// # Returns
    ///
    /// A new `GameServer` instance ready to be started.
    pub fn new(config: ServerConfig) -> Self {
        let validator = Arc::new(ResourceTypeList::new(&config.valid_resource_types));
        Self::with_validator(config, validator)
    }

    /// Creates a new game server that checks resource types with `validator`.
    ///
    /// `config.valid_resource_types` is ignored.
    pub fn with_validator(config: ServerConfig, validator: Arc<dyn ResourceTypeValidator>) -> Self {
        let registry = Arc::new(PlayerRegistry::new());
        let router = MessageRouter::new(HandlerContext::new(registry.clone(), validator));
        let connection_manager = ConnectionManager::new(config.max_connections);

        Self {
            context: Arc::new(ServerContext {
                config,
                registry,
                router,
                connection_manager,
            }),
            shutdown_state: ShutdownState::new(),
        }
    }

    /// The configuration the server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.context.config
    }

    /// The process-wide player registry.
    pub fn registry(&self) -> Arc<PlayerRegistry> {
        self.context.registry.clone()
    }

    /// The message router shared by all connections.
    pub fn router(&self) -> &MessageRouter {
        &self.context.router
    }

    /// Number of currently open connections.
    pub async fn connection_count(&self) -> usize {
        self.context.connection_manager.connection_count().await
    }

    /// Starts the game server and begins accepting connections.
    ///
    /// Binds `config.bind_address` and runs until [`GameServer::shutdown`]
    /// is called.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the server started and stopped cleanly, or a `ServerError`
    /// if the listener could not be bound.
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown_state(self.shutdown_state.clone()).await
    }

    /// Starts the game server with graceful shutdown support.
    ///
    /// The server runs until shutdown is initiated through `shutdown_state`
    /// or [`GameServer::shutdown`] is called.
    ///
    /// # Arguments
    ///
    /// * `shutdown_state` - Shared shutdown state for coordinating graceful shutdown
    pub async fn start_with_shutdown_state(&self, shutdown_state: ShutdownState) -> Result<(), ServerError> {
        let bind_address = self.context.config.bind_address;
        info!("🚀 Starting gift server on {}", bind_address);

        let listener = TcpListener::bind(bind_address)
            .await
            .map_err(|e| ServerError::Network(format!("Failed to bind {bind_address}: {e}")))?;

        self.serve(listener, shutdown_state).await
    }

    /// Runs the accept loop on an already bound listener.
    ///
    /// # Shutdown Sequence
    ///
    /// 1. Stop accepting once shutdown is initiated (either trigger)
    /// 2. Let every connection task close its socket
    /// 3. Abort connections still open after the drain timeout
    /// 4. Mark `shutdown_state` complete
    pub async fn serve(&self, listener: TcpListener, shutdown_state: ShutdownState) -> Result<(), ServerError> {
        let local_addr: Option<SocketAddr> = listener.local_addr().ok();
        info!(
            "🎁 Accepting connections on {} ({} resource types, evict on disconnect: {})",
            local_addr.map_or_else(|| "unknown address".to_string(), |addr| addr.to_string()),
            self.context.config.valid_resource_types.len(),
            self.context.config.evict_on_disconnect
        );

        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let context = self.context.clone();
                        let shutdown = shutdown_state.clone();

                        // Spawn individual connection handler
                        connections.spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, context, shutdown).await {
                                debug!("Connection from {} ended with error: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                    }
                },
                _ = shutdown_state.wait() => {
                    info!("🛑 Accept loop stopping - shutdown initiated");
                    break;
                }
                _ = self.shutdown_state.wait() => {
                    info!("Internal shutdown signal received");
                    break;
                }
            }

            while connections.try_join_next().is_some() {}
        }

        // Either trigger closes every connection.
        shutdown_state.initiate_shutdown();

        info!("🧹 Waiting for {} connection(s) to close...", connections.len());
        let drained = tokio::time::timeout(CONNECTION_DRAIN_TIMEOUT, async {
            while connections.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!("⏱️ Aborting {} connection(s) that did not close in time", connections.len());
            connections.abort_all();
        }

        shutdown_state.complete_shutdown();
        info!("Server stopped");
        Ok(())
    }

    /// Signals the server to stop accepting connections and shut down.
    pub async fn shutdown(&self) -> Result<(), ServerError> {
        self.shutdown_state.initiate_shutdown();
        Ok(())
    }
}
