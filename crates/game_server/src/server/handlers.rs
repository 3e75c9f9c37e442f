//! Connection handling logic for WebSocket clients.
//!
//! This module contains the core connection handling logic that manages
//! the lifecycle of individual client connections, including WebSocket
//! handshaking, message processing, and cleanup.

use super::core::ServerContext;
use crate::{
    connection::ConnectionHandle,
    error::ServerError,
    messaging::RouterError,
    security::validate_json_message,
    shutdown::ShutdownState,
};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{Message, Utf8Bytes};
use tokio_tungstenite::accept_async;
use tracing::{debug, error, trace, warn};

/// How long the writer may keep flushing queued frames after the reader stopped.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handles a single client connection from establishment to cleanup.
///
/// # Connection Flow
///
/// 1. Perform WebSocket handshake
/// 2. Register connection with the connection manager (refused when full)
/// 3. Spawn the writer task draining the connection's outbound queue
/// 4. Read frames strictly in order, dispatching each text frame and
///    queueing its reply
/// 5. On close, transport error or shutdown: release the players bound to
///    this connection and remove the connection record
///
/// # Arguments
///
/// * `stream` - The TCP stream for the client connection
/// * `addr` - The remote address of the client
/// * `context` - Shared registry, router and connection accounting
/// * `shutdown` - Closes the connection when server shutdown begins
///
/// # Returns
///
/// `Ok(())` if the connection was handled successfully, or a `ServerError`
/// if the handshake failed or the connection was refused.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    context: Arc<ServerContext>,
    shutdown: ShutdownState,
) -> Result<(), ServerError> {
    // Perform WebSocket handshake
    let mut ws_stream = accept_async(stream)
        .await
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;

    let connection_id = match context.connection_manager.add_connection(addr).await {
        Ok(connection_id) => connection_id,
        Err(e) => {
            warn!("🚫 Refusing {}: {}", addr, e);
            let frame = CloseFrame {
                code: CloseCode::Again,
                reason: Utf8Bytes::from_static("Server is full"),
            };
            if let Err(close_error) = ws_stream.close(Some(frame)).await {
                debug!("Close frame to {} not delivered: {}", addr, close_error);
            }
            return Err(e);
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (handle, mut outbound) = ConnectionHandle::channel(connection_id);

    // Outgoing task: replies and pushes share this single FIFO
    let writer = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            let closing = matches!(message, Message::Close(_));
            if let Err(e) = ws_sender.send(message).await {
                debug!("Failed to send to connection {}: {}", connection_id, e);
                break;
            }
            if closing {
                break;
            }
        }
        if let Err(e) = ws_sender.close().await {
            debug!("Close of connection {} did not complete: {}", connection_id, e);
        }
    });

    // Incoming loop: one request in flight per connection
    loop {
        let frame = tokio::select! {
            frame = ws_receiver.next() => frame,
            _ = shutdown.wait() => {
                debug!("🛑 Closing connection {} for shutdown", connection_id);
                if let Err(e) = handle.send(Message::Close(Some(CloseFrame {
                    code: CloseCode::Away,
                    reason: Utf8Bytes::from_static("Server shutting down"),
                }))) {
                    debug!("Shutdown close frame not queued: {}", e);
                }
                break;
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                context.connection_manager.record_frame(connection_id).await;

                let reply = match validate_json_message(text.as_bytes(), &context.config.security) {
                    Ok(()) => context.router.route_client_message(text.as_str(), &handle).await,
                    Err(e) => {
                        warn!("🛡️ Rejected frame from connection {}: {}", connection_id, e);
                        RouterError::InvalidFormat.to_string()
                    }
                };

                trace!("📤 Reply to connection {}: {}", connection_id, reply);
                if handle.send_text(reply).is_err() {
                    break;
                }
            }
            Some(Ok(Message::Ping(data))) => {
                if let Err(e) = handle.send(Message::Pong(data)) {
                    debug!("Pong not queued: {}", e);
                    break;
                }
            }
            Some(Ok(Message::Close(_))) | None => {
                debug!("🔌 Client {} requested close", connection_id);
                break;
            }
            Some(Ok(_)) => {
                trace!("Ignoring non-text frame on connection {}", connection_id);
            }
            Some(Err(e)) => {
                error!("WebSocket error for connection {}: {}", connection_id, e);
                break;
            }
        }
    }

    drop(handle);
    context
        .registry
        .release_connection(connection_id, context.config.evict_on_disconnect);
    context.connection_manager.remove_connection(connection_id).await;

    let writer_abort = writer.abort_handle();
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        warn!("⏱️ Writer for connection {} did not drain in time", connection_id);
        writer_abort.abort();
    }
    Ok(())
}
