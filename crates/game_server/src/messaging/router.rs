//! Message routing logic for dispatching client messages to handlers.
//!
//! This module parses incoming envelopes, resolves their type tag to one of
//! the fixed [`MessageKind`]s and runs the matching handler. The set of
//! handlers is fixed when the router is built; nothing is registered at
//! runtime.

use crate::connection::ConnectionHandle;
use crate::error::HandlerError;
use crate::handlers::{HandlerContext, LoginHandler, SendGiftHandler, UpdateResourcesHandler};
use crate::messaging::types::{ClientMessage, Envelope, MessageKind, Reply, SuccessReply};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, trace, warn};

/// Envelope-level failures.
///
/// Unlike handler errors these are sent back as plain text, not as a
/// structured `Status` reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// Unparseable JSON, a non-object frame, or a missing `Type`.
    #[error("Invalid message format")]
    InvalidFormat,

    #[error("Unknown message type")]
    UnknownType(String),
}

/// Reply sent when a structured reply cannot be serialized.
const FALLBACK_REPLY: &str = r#"{"Status":"Error","Message":"An unexpected error occurred"}"#;

/// Dispatches client messages to the Login, UpdateResources and SendGift
/// handlers.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    login: LoginHandler,
    update_resources: UpdateResourcesHandler,
    send_gift: SendGiftHandler,
}

impl MessageRouter {
    /// Builds every handler over the same shared context.
    pub fn new(context: HandlerContext) -> Self {
        Self {
            login: LoginHandler::new(context.clone()),
            update_resources: UpdateResourcesHandler::new(context.clone()),
            send_gift: SendGiftHandler::new(context),
        }
    }

    /// Routes a raw client message and renders the reply text.
    ///
    /// # Arguments
    ///
    /// * `text` - The raw message text from the client (expected to be JSON)
    /// * `connection` - The originating connection; Login binds it to the new player
    ///
    /// # Returns
    ///
    /// The JSON reply for the originating connection, or the plain text of a
    /// [`RouterError`] when the envelope itself could not be understood.
    pub async fn route_client_message(&self, text: &str, connection: &ConnectionHandle) -> String {
        match self.route(text, connection).await {
            Ok(reply) => reply.to_json().unwrap_or_else(|e| {
                error!("❌ Failed to serialize reply: {}", e);
                FALLBACK_REPLY.to_string()
            }),
            Err(e) => e.to_string(),
        }
    }

    /// Parses the envelope and runs the matching handler.
    ///
    /// A panic inside a handler is caught here and reported as an unexpected
    /// error; it never takes the connection task down.
    pub async fn route(&self, text: &str, connection: &ConnectionHandle) -> Result<Reply, RouterError> {
        let (kind, payload) = parse_envelope(text)?;

        debug!("📨 Routing {} message from connection {}", kind, connection.id());

        let result = match ClientMessage::decode(kind, payload) {
            Ok(message) => AssertUnwindSafe(self.dispatch(message, connection))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    let details = panic_message(panic.as_ref());
                    error!("💥 {} handler panicked: {}", kind, details);
                    Err(HandlerError::Unexpected(details))
                }),
            Err(e) => {
                warn!("❌ Malformed {} payload from connection {}: {:?}", kind, connection.id(), e.details());
                Err(e)
            }
        };

        let reply = Reply::from(result);
        trace!("✅ {} handled for connection {} (success: {})", kind, connection.id(), reply.is_success());
        Ok(reply)
    }

    async fn dispatch(&self, message: ClientMessage, connection: &ConnectionHandle) -> Result<SuccessReply, HandlerError> {
        match message {
            ClientMessage::Login(payload) => self.login.handle(payload, connection).await,
            ClientMessage::UpdateResources(payload) => self.update_resources.handle(payload).await,
            ClientMessage::SendGift(payload) => self.send_gift.handle(payload).await,
        }
    }
}

fn parse_envelope(text: &str) -> Result<(MessageKind, serde_json::Value), RouterError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        debug!("Envelope is not valid JSON: {}", e);
        RouterError::InvalidFormat
    })?;
    if !value.is_object() {
        return Err(RouterError::InvalidFormat);
    }

    let envelope: Envelope = serde_json::from_value(value).map_err(|_| RouterError::InvalidFormat)?;
    let tag = envelope.kind.ok_or(RouterError::InvalidFormat)?;
    let kind = tag.parse::<MessageKind>().map_err(|unknown| {
        warn!("❓ Unknown message type '{}'", unknown.0);
        RouterError::UnknownType(unknown.0)
    })?;

    Ok((kind, envelope.payload))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
